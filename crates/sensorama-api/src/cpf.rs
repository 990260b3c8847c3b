//! Brazilian individual taxpayer id (CPF) checks and formatting.
//!
//! A CPF is eleven digits: nine base digits and two check digits, each a
//! weighted mod-11 sum of the digits before it.

/// Keeps only the ASCII digits of `input`.
pub fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Whether `input` is a well-formed CPF. Punctuation is ignored.
///
/// Rejects anything that is not eleven digits, and the eleven
/// repeated-digit sequences (`000.000.000-00` and so on), which pass the
/// checksum but are never issued.
pub fn is_valid(input: &str) -> bool {
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Check digit over `prefix`: weights run from `len + 1` down to 2.
fn check_digit(prefix: &[u32]) -> u32 {
    let top = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (top - i as u32))
        .sum();
    match 11 - sum % 11 {
        10 | 11 => 0,
        digit => digit,
    }
}

/// Formats eleven digits as `XXX.XXX.XXX-XX`.
///
/// Input that does not reduce to exactly eleven digits is returned
/// unchanged, so a half-typed value is never mangled.
pub fn format(input: &str) -> String {
    let d = digits(input);
    if d.len() != 11 {
        return input.to_owned();
    }
    format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..])
}
