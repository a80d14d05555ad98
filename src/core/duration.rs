//! Duration strings
//!
//! Parses strings of the form `<number><unit>` (for example `300ms` or `1.5s`)
//! into a quantity that converts to milliseconds.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Known units and their size in milliseconds
const UNITS: &[(&str, f64)] = &[
    ("ms", 1.0),
    ("s", 1_000.0),
    ("m", 60_000.0),
    ("h", 3_600_000.0),
    ("d", 86_400_000.0),
    ("w", 604_800_000.0),
    ("y", 31_556_736_000.0),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DurationError {
    #[error("Invalid unit '{unit}' in duration '{input}'")]
    InvalidUnit { input: String, unit: String },

    #[error("Invalid number in duration '{0}'")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, DurationError>;

/// A scalar plus unit, convertible to milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Duration {
    scalar: f64,
    unit: &'static str,
    multiplier: f64,
}

impl Duration {
    /// Parse `<number><unit>`. The unit is everything after the numeric prefix.
    pub fn parse(text: &str) -> Result<Self> {
        let split = leading_float_len(text);
        let (number, unit) = text.split_at(split);

        let scalar: f64 = number
            .parse()
            .map_err(|_| DurationError::InvalidNumber(text.to_string()))?;
        if !scalar.is_finite() || scalar < 0.0 {
            return Err(DurationError::InvalidNumber(text.to_string()));
        }

        let (unit, multiplier) = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .copied()
            .ok_or_else(|| DurationError::InvalidUnit {
                input: text.to_string(),
                unit: unit.to_string(),
            })?;

        Ok(Self { scalar, unit, multiplier })
    }

    #[allow(dead_code)]
    pub fn scalar(&self) -> f64 {
        self.scalar
    }

    #[allow(dead_code)]
    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// Length in milliseconds
    pub fn as_millis_f64(&self) -> f64 {
        self.scalar * self.multiplier
    }

    /// Convert to a std duration, rounded to the nearest nanosecond.
    /// Lengths past `u64::MAX` nanoseconds saturate.
    pub fn to_std(&self) -> std::time::Duration {
        std::time::Duration::from_nanos((self.as_millis_f64() * 1_000_000.0).round() as u64)
    }
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scalar, self.unit)
    }
}

/// Byte length of the longest float literal at the start of `text`
/// (sign, digits, fraction, exponent).
fn leading_float_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    // Exponent only counts if at least one digit follows it
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_multipliers() {
        let cases = [
            ("300ms", 300.0),
            ("2s", 2_000.0),
            ("3m", 180_000.0),
            ("1h", 3_600_000.0),
            ("2d", 172_800_000.0),
            ("1w", 604_800_000.0),
            ("1y", 31_556_736_000.0),
        ];
        for (text, expected) in cases {
            let d = Duration::parse(text).unwrap();
            assert_eq!(d.as_millis_f64(), expected, "{}", text);
        }
    }

    #[test]
    fn test_fractional_scalar() {
        let d = Duration::parse("1.5s").unwrap();
        assert_eq!(d.scalar(), 1.5);
        assert_eq!(d.unit(), "s");
        assert_eq!(d.as_millis_f64(), 1500.0);
        assert_eq!(d.to_std(), std::time::Duration::from_millis(1500));

        // "m" followed by "s" is the ms unit, not minutes
        assert_eq!(Duration::parse("250ms").unwrap().to_std().as_millis(), 250);
    }

    #[test]
    fn test_exponent() {
        let d = Duration::parse("1e3ms").unwrap();
        assert_eq!(d.as_millis_f64(), 1000.0);
    }

    #[test]
    fn test_invalid_unit() {
        for text in ["10", "10x", "10 ms", "10MS", "5sec", "1.2.3s"] {
            match Duration::parse(text) {
                Err(DurationError::InvalidUnit { .. }) => {}
                other => panic!("{}: expected InvalidUnit, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_invalid_number() {
        for text in ["ms", "", "-5s", ".s"] {
            assert!(
                matches!(Duration::parse(text), Err(DurationError::InvalidNumber(_))),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_from_str_and_display() {
        let d: Duration = "300ms".parse().unwrap();
        assert_eq!(d.to_string(), "300ms");
    }
}
