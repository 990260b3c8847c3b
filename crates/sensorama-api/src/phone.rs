//! Brazilian mobile numbers: two-digit area code plus nine digits.

use crate::cpf::digits;

/// Whether `input` holds exactly eleven digits once punctuation is removed.
pub fn is_valid(input: &str) -> bool {
    digits(input).len() == 11
}

/// Formats eleven digits as `XX XXXXX-XXXX`; anything else is returned
/// unchanged.
pub fn format(input: &str) -> String {
    let d = digits(input);
    if d.len() != 11 {
        return input.to_owned();
    }
    format!("{} {}-{}", &d[..2], &d[2..7], &d[7..])
}
