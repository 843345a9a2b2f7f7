#![forbid(unsafe_code)]

//! National-ID (CPF) checksum core.
//!
//! An identifier is 11 digits; the last two are check digits computed from
//! the preceding ones with a mod-11 reduction. [`is_valid`] accepts raw
//! user input, strips separators, and verifies both digits. Malformed
//! input yields `false`, never an error.
//!
//! [`check_digit`] exposes the shared reduction so tests can synthesize
//! valid identifiers, and [`format_mask`] renders the progressive
//! `000.000.000-00` display mask for as-you-type formatting.

/// Length of a complete identifier after stripping separators.
pub const ID_LEN: usize = 11;

/// Strip every non-digit character from `raw`.
#[must_use]
pub fn strip_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Compute the next check digit for a digit prefix.
///
/// Digit `d[i]` is weighted by `len + 1 - i`, so a 9-digit prefix uses
/// weights 10 down to 2 and a 10-digit prefix uses 11 down to 2. The sum
/// is reduced mod 11: a remainder below 2 maps to 0, anything else to
/// `11 - remainder`.
#[must_use]
pub fn check_digit(digits: &[u8]) -> u8 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * (top - i as u32))
        .sum();
    let r = sum % 11;
    if r < 2 { 0 } else { (11 - r) as u8 }
}

/// Validate a raw identifier.
///
/// Strips non-digits, then rejects anything that is not exactly 11 digits,
/// the degenerate all-identical patterns, and any checksum mismatch.
/// Pure and deterministic; same input, same answer.
#[must_use]
pub fn is_valid(raw: &str) -> bool {
    let digits: Vec<u8> = raw
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| d as u8))
        .collect();

    if digits.len() != ID_LEN {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Render the progressive `000.000.000-00` display mask.
///
/// Takes raw input, keeps the first 11 digits, and inserts separators as
/// far as the input reaches: `"1114"` becomes `"111.4"`, a full identifier
/// becomes `"111.444.777-35"`. Excess digits beyond 11 are ignored.
#[must_use]
pub fn format_mask(raw: &str) -> String {
    let mut out = String::with_capacity(ID_LEN + 3);
    for (i, c) in raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(ID_LEN)
        .enumerate()
    {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
