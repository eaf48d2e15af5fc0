//! Character-class detection for identifying values

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Semantic class of a field value, which decides the replacement alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueClass {
    /// Digits only, in any script
    Numeric,
    /// Letters only, and the fallback for anything unclassifiable
    Alpha,
    /// A mix of letters and digits
    Alnum,
    /// `M/D/YYYY` style date
    Date,
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueClass::Numeric => "numeric",
            ValueClass::Alpha => "alpha",
            ValueClass::Alnum => "alnum",
            ValueClass::Date => "date",
        };
        f.write_str(label)
    }
}

/// Classifier variant
///
/// The base variant never reports [`ValueClass::Date`]. Tables remember the
/// options they were built with so later runs classify the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassifierOptions {
    /// Recognize `M/D/YYYY` dates and reduce them to the birth year
    #[serde(default)]
    pub recognize_dates: bool,
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("date pattern is a valid regex")
    })
}

/// Digit in any script, excluding numeric letters such as Roman numerals
fn is_digit(c: char) -> bool {
    c.is_numeric() && !c.is_alphabetic()
}

/// Classify a value
///
/// Empty strings and values containing anything other than letters and
/// digits fall back to [`ValueClass::Alpha`] unless they are dates and
/// `options.recognize_dates` is set.
pub fn classify(value: &str, options: ClassifierOptions) -> ValueClass {
    if !value.is_empty() {
        if value.chars().all(is_digit) {
            return ValueClass::Numeric;
        }
        if value.chars().all(char::is_alphabetic) {
            return ValueClass::Alpha;
        }
        if value.chars().all(char::is_alphanumeric) {
            return ValueClass::Alnum;
        }
    }

    if options.recognize_dates && date_pattern().is_match(value) {
        return ValueClass::Date;
    }

    ValueClass::Alpha
}

/// Year component of an `M/D/YYYY` date
pub fn date_year(value: &str) -> Option<&str> {
    date_pattern()
        .captures(value)
        .and_then(|caps| caps.get(3))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const BASE: ClassifierOptions = ClassifierOptions {
        recognize_dates: false,
    };
    const DATES: ClassifierOptions = ClassifierOptions {
        recognize_dates: true,
    };

    #[test_case("9876543210", ValueClass::Numeric ; "digits")]
    #[test_case("0", ValueClass::Numeric ; "single digit")]
    #[test_case("١٢٣", ValueClass::Numeric ; "arabic indic digits")]
    #[test_case("१२३४", ValueClass::Numeric ; "devanagari digits")]
    #[test_case("Smith", ValueClass::Alpha ; "letters")]
    #[test_case("Zoë", ValueClass::Alpha ; "non ascii letters")]
    #[test_case("A1B2C3", ValueClass::Alnum ; "mixed")]
    #[test_case("O'Brien", ValueClass::Alpha ; "punctuation falls back")]
    #[test_case("Mary Ann", ValueClass::Alpha ; "space falls back")]
    #[test_case("", ValueClass::Alpha ; "empty falls back")]
    #[test_case("1/2/1950", ValueClass::Alpha ; "date not recognized in base variant")]
    fn test_classify_base(value: &str, expected: ValueClass) {
        assert_eq!(classify(value, BASE), expected);
    }

    #[test_case("1/2/1950", ValueClass::Date ; "short date")]
    #[test_case("12/31/2001", ValueClass::Date ; "long date")]
    #[test_case("123/1/1950", ValueClass::Alpha ; "three digit month")]
    #[test_case("1/2/50", ValueClass::Alpha ; "two digit year")]
    #[test_case("1950-01-02", ValueClass::Alpha ; "iso date is not recognized")]
    #[test_case("19500102", ValueClass::Numeric ; "digits stay numeric")]
    fn test_classify_with_dates(value: &str, expected: ValueClass) {
        assert_eq!(classify(value, DATES), expected);
    }

    #[test]
    fn test_date_year() {
        assert_eq!(date_year("3/14/1987"), Some("1987"));
        assert_eq!(date_year("not a date"), None);
    }
}
