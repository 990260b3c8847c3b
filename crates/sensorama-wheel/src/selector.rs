//! Mapping a spin's resting angle to the segment under the pointer.
//!
//! # Geometry
//!
//! The wheel is drawn with segment 0 starting at the pointer (12 o'clock)
//! and segments laid out clockwise. Spinning rotates the wheel clockwise
//! by `full_rotations + final_fraction` turns; only the fraction decides
//! where it stops. After the rotation the pointer sits at
//! `360 - landing` degrees of the original layout, so the selector walks
//! back from there and shifts by half a segment to land in the middle of
//! whichever slice contains that point.

use std::num::NonZeroUsize;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::{Catalog, Segment};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Returns the index of the segment under the pointer when the wheel rests
/// at `final_fraction` of a turn.
///
/// Total over every `f64`: values outside `[0, 1)` are folded back into
/// range and NaN is treated as `0.0`. The result is always `< n`.
pub fn select_index(final_fraction: f64, n: NonZeroUsize) -> usize {
    let n = n.get();
    let width = 360.0 / n as f64;
    let fraction = fold_fraction(final_fraction);

    let landing = (fraction * 360.0) % 360.0;
    let adjusted = (360.0 - landing + width / 2.0) % 360.0;
    // `adjusted` is in [0, 360) so the floor is non-negative; the modulo
    // guards the one rounding case where it reaches exactly `n`.
    (adjusted / width).floor() as usize % n
}

/// Folds any `f64` into `[0, 1)`. NaN and infinities become `0.0`.
///
/// `rem_euclid` rounds tiny negative inputs up to exactly `1.0`, which is
/// the same resting angle as `0.0`.
fn fold_fraction(fraction: f64) -> f64 {
    if !fraction.is_finite() {
        return 0.0;
    }
    let folded = fraction.rem_euclid(1.0);
    if folded >= 1.0 { 0.0 } else { folded }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing and rotation settings for the wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelConfig {
    /// Lowest number of whole turns before the final fraction (inclusive).
    pub min_rotations: u32,
    /// Highest number of whole turns (exclusive).
    pub max_rotations: u32,
    /// How long the spin animation runs.
    pub spin_duration: Duration,
    /// Pause after the wheel stops before navigating to the game.
    pub reveal_delay: Duration,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            min_rotations: 3,
            max_rotations: 5,
            spin_duration: Duration::from_millis(4000),
            reveal_delay: Duration::from_millis(2000),
        }
    }
}

impl WheelConfig {
    /// Fix any out-of-range values so the config is safe to draw from.
    ///
    /// Called automatically by [`Wheel::new`]. Rules:
    /// - `min_rotations` is at least 1 so the wheel visibly turns.
    /// - `max_rotations` is forced above `min_rotations` so the range is
    ///   never empty.
    pub fn validated(mut self) -> Self {
        if self.min_rotations == 0 {
            self.min_rotations = 1;
        }
        if self.max_rotations <= self.min_rotations {
            warn!(
                min = self.min_rotations,
                max = self.max_rotations,
                "max_rotations must exceed min_rotations, widening range"
            );
            self.max_rotations = self.min_rotations + 1;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Spin
// ---------------------------------------------------------------------------

/// The outcome of one spin: what the animation should do and which
/// segment it ends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spin {
    /// Index of the winning segment in the catalog.
    pub index: usize,
    /// The winning segment.
    pub segment: Segment,
    /// Whole turns before the final fraction. Cosmetic only.
    pub full_rotations: u32,
    /// Where in the last turn the wheel stops, in `[0, 1)`.
    pub final_fraction: f64,
    /// How long the animation should run.
    pub duration: Duration,
    /// Pause after stopping before navigation.
    pub reveal_delay: Duration,
}

impl Spin {
    /// Total rotation in turns (`full_rotations + final_fraction`).
    pub fn total_rotation(&self) -> f64 {
        self.full_rotations as f64 + self.final_fraction
    }

    /// Total rotation in degrees, for driving the animation.
    pub fn total_rotation_degrees(&self) -> f64 {
        self.total_rotation() * 360.0
    }

    /// The wheel's resting position after the spin, as a fraction of a turn.
    ///
    /// The next spin animates from here, so the wheel never snaps back
    /// to zero between spins.
    pub fn resting_fraction(&self) -> f64 {
        self.total_rotation() % 1.0
    }

    /// Degrees the wheel moved within its final turn.
    pub fn landing_angle(&self) -> f64 {
        (self.final_fraction * 360.0) % 360.0
    }
}

// ---------------------------------------------------------------------------
// Wheel
// ---------------------------------------------------------------------------

/// A catalog plus the settings used to spin it.
#[derive(Debug, Clone)]
pub struct Wheel {
    catalog: Catalog,
    config: WheelConfig,
}

impl Wheel {
    pub fn new(catalog: Catalog, config: WheelConfig) -> Self {
        Self {
            catalog,
            config: config.validated(),
        }
    }

    /// Draws a random spin.
    ///
    /// The outcome is uniform over segments: `final_fraction` is uniform
    /// on `[0, 1)` and every segment covers the same share of a turn.
    pub fn spin<R: Rng + ?Sized>(&self, rng: &mut R) -> Spin {
        let full = rng.random_range(self.config.min_rotations..self.config.max_rotations);
        let fraction: f64 = rng.random();
        self.spin_with(full, fraction)
    }

    /// Builds the spin for a known rotation. Deterministic.
    pub fn spin_with(&self, full_rotations: u32, final_fraction: f64) -> Spin {
        let final_fraction = fold_fraction(final_fraction);
        let index = select_index(final_fraction, self.catalog.segment_count());
        // `select_index` always returns an in-range index for this catalog.
        let segment = self.catalog.segments()[index].clone();

        debug!(
            index,
            segment = %segment.name,
            full_rotations,
            final_fraction,
            "wheel spin drawn"
        );

        Spin {
            index,
            segment,
            full_rotations,
            final_fraction,
            duration: self.config.spin_duration,
            reveal_delay: self.config.reveal_delay,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }
}

impl Default for Wheel {
    fn default() -> Self {
        Self::new(Catalog::default(), WheelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn five() -> NonZeroUsize {
        NonZeroUsize::new(5).unwrap()
    }

    #[test]
    fn test_select_index_zero_fraction_picks_first_segment() {
        assert_eq!(select_index(0.0, five()), 0);
    }

    #[test]
    fn test_select_index_five_segments_matches_table() {
        let cases = [
            (0.05, 0),
            (0.15, 4),
            (0.35, 3),
            (0.55, 2),
            (0.75, 1),
            (0.95, 0),
        ];
        for (fraction, expected) in cases {
            assert_eq!(
                select_index(fraction, five()),
                expected,
                "fraction {fraction} should land on segment {expected}"
            );
        }
    }

    #[test]
    fn test_select_index_out_of_range_inputs_fold_into_range() {
        assert_eq!(select_index(1.15, five()), select_index(0.15, five()));
        assert_eq!(select_index(-0.85, five()), select_index(0.15, five()));
        assert_eq!(select_index(f64::NAN, five()), 0);
        assert_eq!(select_index(f64::INFINITY, five()), 0);
    }

    #[test]
    fn test_spin_with_tiny_negative_fraction_stays_below_one() {
        let wheel = Wheel::default();
        for fraction in [-1e-20, -f64::MIN_POSITIVE, -0.0] {
            let spin = wheel.spin_with(3, fraction);
            assert!(
                (0.0..1.0).contains(&spin.final_fraction),
                "{fraction} folded to {}",
                spin.final_fraction
            );
            assert_eq!(spin.index, 0);
            assert_eq!(spin.index, select_index(fraction, five()));
        }
    }

    #[test]
    fn test_select_index_single_segment_always_zero() {
        let one = NonZeroUsize::new(1).unwrap();
        for k in 0..100 {
            assert_eq!(select_index(k as f64 / 100.0, one), 0);
        }
    }

    #[test]
    fn test_select_index_grid_is_uniform_across_segments() {
        // 3600 evenly spaced fractions, offset by half a step so none sits
        // on a segment boundary.
        let mut counts = [0usize; 5];
        for k in 0..3600 {
            let fraction = (k as f64 + 0.5) / 3600.0;
            counts[select_index(fraction, five())] += 1;
        }
        assert_eq!(counts, [720; 5]);
    }

    #[test]
    fn test_spin_seeded_draws_are_roughly_fair() {
        let wheel = Wheel::default();
        let mut rng = StdRng::seed_from_u64(0x5e45_0a4a);
        let mut counts = [0usize; 5];
        let draws = 10_000;

        for _ in 0..draws {
            counts[wheel.spin(&mut rng).index] += 1;
        }

        for (i, &c) in counts.iter().enumerate() {
            assert!(
                (1700..=2300).contains(&c),
                "segment {i} drawn {c} times out of {draws}"
            );
        }
    }

    #[test]
    fn test_spin_full_rotations_in_configured_range() {
        let wheel = Wheel::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let spin = wheel.spin(&mut rng);
            assert!((3..5).contains(&spin.full_rotations));
            assert!((0.0..1.0).contains(&spin.final_fraction));
        }
    }

    #[test]
    fn test_spin_with_outcome_ignores_full_rotations() {
        let wheel = Wheel::default();
        for full in 0..10 {
            let spin = wheel.spin_with(full, 0.35);
            assert_eq!(spin.index, 3);
            assert_eq!(spin.segment.name, "ECO LÓGICO");
        }
    }

    #[test]
    fn test_spin_resting_fraction_equals_final_fraction() {
        let spin = Wheel::default().spin_with(4, 0.25);
        assert_eq!(spin.total_rotation(), 4.25);
        assert_eq!(spin.total_rotation_degrees(), 1530.0);
        assert_eq!(spin.resting_fraction(), 0.25);
        assert_eq!(spin.landing_angle(), 90.0);
    }

    #[test]
    fn test_spin_carries_configured_timing() {
        let spin = Wheel::default().spin_with(3, 0.0);
        assert_eq!(spin.duration, Duration::from_millis(4000));
        assert_eq!(spin.reveal_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_validated_empty_rotation_range_is_widened() {
        let cfg = WheelConfig {
            min_rotations: 4,
            max_rotations: 4,
            ..Default::default()
        }
        .validated();
        assert_eq!(cfg.min_rotations, 4);
        assert_eq!(cfg.max_rotations, 5);
    }

    #[test]
    fn test_validated_zero_min_rotations_raised_to_one() {
        let cfg = WheelConfig {
            min_rotations: 0,
            max_rotations: 3,
            ..Default::default()
        }
        .validated();
        assert_eq!(cfg.min_rotations, 1);
        assert_eq!(cfg.max_rotations, 3);
    }
}
