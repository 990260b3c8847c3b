//! The wheel's segments and where each one leads.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::WheelError;

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// One labeled slice of the wheel.
///
/// `destination` is an opaque identifier, resolved to a screen route by a
/// [`RouteTable`]. Keeping the two apart lets the catalog stay pure
/// configuration while the navigation layer owns the paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Full display name, drawn on the result banner.
    pub name: String,
    /// Short label drawn on the slice itself.
    pub short_name: String,
    /// Fill color as `#RRGGBB`.
    pub color: String,
    /// Destination identifier for navigation after the spin.
    pub destination: String,
}

impl Segment {
    pub fn new(
        name: impl Into<String>,
        short_name: impl Into<String>,
        color: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            color: color.into(),
            destination: destination.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A fixed, ordered, non-empty list of segments.
///
/// Segment `i` covers `[i·W, (i+1)·W)` degrees of the wheel, where
/// `W = 360 / len`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct Catalog {
    segments: Vec<Segment>,
}

impl Catalog {
    /// Creates a catalog from segments in wheel order.
    ///
    /// # Errors
    /// Returns [`WheelError::EmptyCatalog`] if `segments` is empty.
    pub fn new(segments: Vec<Segment>) -> Result<Self, WheelError> {
        if segments.is_empty() {
            return Err(WheelError::EmptyCatalog);
        }
        Ok(Self { segments })
    }

    /// Number of segments (never zero).
    pub fn segment_count(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.segments.len()).expect("catalog is never empty")
    }

    /// Angular width of each segment in degrees.
    pub fn segment_width(&self) -> f64 {
        360.0 / self.segments.len() as f64
    }

    /// The segment at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// All segments in wheel order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl TryFrom<Vec<Segment>> for Catalog {
    type Error = WheelError;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<Catalog> for Vec<Segment> {
    fn from(catalog: Catalog) -> Self {
        catalog.segments
    }
}

/// The five Sensorama mini-games, in wheel order.
impl Default for Catalog {
    fn default() -> Self {
        Self {
            segments: vec![
                Segment::new("MAPA MENTAL", "MAPA", "#008C01", "mind-map"),
                Segment::new("PIXELADO", "PIXELADO", "#C70300", "pixelado"),
                Segment::new("QUAL É O OBJETO?", "OBJETO", "#181D8A", "object"),
                Segment::new("ECO LÓGICO", "ECO", "#FF8600", "eco-logical"),
                Segment::new("ZOOM ENIGMA", "ZOOM", "#E3D304", "zoom-puzzle"),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

/// Maps segment destinations to router paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Adds (or replaces) the route for `destination`.
    pub fn with_route(
        mut self,
        destination: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        self.routes.insert(destination.into(), route.into());
        self
    }

    /// Looks up a route without failing.
    pub fn get(&self, destination: &str) -> Option<&str> {
        self.routes.get(destination).map(String::as_str)
    }

    /// Resolves a destination to its route.
    ///
    /// # Panics
    /// Panics if `destination` is unknown. That means the catalog and the
    /// navigation table disagree, which is a build-time mistake that
    /// should never be papered over with a default screen. Run
    /// [`check`](Self::check) at startup to catch it early.
    pub fn route_for(&self, destination: &str) -> &str {
        match self.get(destination) {
            Some(route) => route,
            None => panic!("no route for wheel destination {destination:?}"),
        }
    }

    /// Verifies every segment in `catalog` has a route.
    ///
    /// # Errors
    /// Returns [`WheelError::UnknownDestination`] for the first segment
    /// without one.
    pub fn check(&self, catalog: &Catalog) -> Result<(), WheelError> {
        for segment in catalog.segments() {
            if self.get(&segment.destination).is_none() {
                return Err(WheelError::UnknownDestination {
                    segment: segment.name.clone(),
                    destination: segment.destination.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Routes for the default catalog's question screens.
impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
            .with_route("mind-map", "/questions/mindMapQuestion")
            .with_route("pixelado", "/questions/pixeladoQuestion")
            .with_route("object", "/questions/objectQuestion")
            .with_route("eco-logical", "/questions/ecoLogicalQuestion")
            .with_route("zoom-puzzle", "/questions/zomPuzzleQuestion")
    }
}
