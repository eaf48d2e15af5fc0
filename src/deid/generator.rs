//! Synthetic value generation
//!
//! Replacements keep the character length and class of the original value so
//! downstream tooling that checks field shapes keeps working on deidentified
//! exports. Dates are the exception and are reduced to their year.

use super::classifier::{date_year, ValueClass};
use rand::Rng;

const DIGITS: &[u8] = b"0123456789";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHANUMERIC: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Alphabet replacement characters are drawn from for a class
pub fn alphabet(class: ValueClass) -> &'static [u8] {
    match class {
        ValueClass::Numeric => DIGITS,
        ValueClass::Alpha | ValueClass::Date => LOWERCASE,
        ValueClass::Alnum => ALPHANUMERIC,
    }
}

/// Generate a replacement for `value`
///
/// For every class but [`ValueClass::Date`] the result has as many
/// characters as `value`, each drawn uniformly from [`alphabet`]. Dates
/// produce their four digit year; a value that is not actually a date falls
/// back to a lowercase string of the same length.
pub fn generate<R: Rng + ?Sized>(value: &str, class: ValueClass, rng: &mut R) -> String {
    if class == ValueClass::Date {
        if let Some(year) = date_year(value) {
            return year.to_string();
        }
    }

    let chars = alphabet(class);
    (0..value.chars().count())
        .map(|_| chars[rng.gen_range(0..chars.len())] as char)
        .collect()
}
