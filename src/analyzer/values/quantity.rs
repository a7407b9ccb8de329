//! Kubernetes resource quantities.
//!
//! Parses values such as `128Mi`, `1.5Gi`, `250m`, `2`, `1e3` into a single
//! fixed-point representation so they can be compared and summed regardless
//! of the suffix they were written with.

use crate::error::{AnalyzeError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;
use std::sync::LazyLock;

/// Nano-units per whole unit.
const NANO: i128 = 1_000_000_000;

static QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)(\d+(?:\.\d*)?|\.\d+)(?:([eE][+-]?\d+)|(Ki|Mi|Gi|Ti|Pi|Ei|n|u|m|k|M|G|T|P|E))?$")
        .unwrap()
});

/// A resource quantity stored as a count of nano-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity {
    nanos: i128,
}

impl Quantity {
    pub const ZERO: Quantity = Quantity { nanos: 0 };

    /// Parse a quantity string.
    ///
    /// # Examples
    /// - "128Mi" -> 134217728
    /// - "1Gi" -> 1073741824
    /// - "100m" -> 0.1
    /// - "1e3" -> 1000
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let caps = QUANTITY_REGEX
            .captures(s)
            .ok_or_else(|| AnalyzeError::invalid_value(s, "not a valid quantity"))?;

        let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
        let number = caps.get(2).map(|m| m.as_str()).unwrap_or("0");
        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));

        // mantissa * 10^-frac_len, both as integers
        let digits = format!("{}{}", whole, frac);
        let mantissa: i128 = if digits.is_empty() {
            0
        } else {
            digits
                .parse()
                .map_err(|_| AnalyzeError::invalid_value(s, "quantity is too large"))?
        };
        let frac_len = frac.len() as u32;

        let scaled = if let Some(exp) = caps.get(3) {
            let exp: i32 = exp.as_str()[1..]
                .parse()
                .map_err(|_| AnalyzeError::invalid_value(s, "invalid exponent"))?;
            exp.checked_add(9).and_then(|exp| scale_decimal(mantissa, frac_len, exp))
        } else {
            let suffix = caps.get(4).map(|m| m.as_str()).unwrap_or("");
            match suffix {
                "Ki" | "Mi" | "Gi" | "Ti" | "Pi" | "Ei" => {
                    let power = match suffix {
                        "Ki" => 1,
                        "Mi" => 2,
                        "Gi" => 3,
                        "Ti" => 4,
                        "Pi" => 5,
                        _ => 6,
                    };
                    let multiplier = 1024i128.pow(power) * NANO;
                    let divisor = 10i128.checked_pow(frac_len);
                    mantissa
                        .checked_mul(multiplier)
                        .zip(divisor)
                        .map(|(v, d)| v / d)
                }
                _ => {
                    let exp = match suffix {
                        "n" => -9,
                        "u" => -6,
                        "m" => -3,
                        "" => 0,
                        "k" => 3,
                        "M" => 6,
                        "G" => 9,
                        "T" => 12,
                        "P" => 15,
                        _ => 18,
                    };
                    scale_decimal(mantissa, frac_len, exp + 9)
                }
            }
        };
        let nanos = scaled.ok_or_else(|| AnalyzeError::invalid_value(s, "quantity is out of range"))?;

        Ok(Self {
            nanos: if negative { -nanos } else { nanos },
        })
    }

    /// A quantity of whole units (bytes, cores, pods).
    pub fn from_units(units: i64) -> Self {
        Self {
            nanos: units as i128 * NANO,
        }
    }

    /// A quantity of bytes.
    pub fn from_bytes(bytes: u64) -> Self {
        Self {
            nanos: bytes as i128 * NANO,
        }
    }

    /// The value in whole units, truncated, if it fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        i64::try_from(self.nanos / NANO).ok()
    }

    /// The value in thousandths of a unit (millicores for CPU).
    pub fn as_milli(&self) -> i128 {
        self.nanos / 1_000_000
    }

    /// The value as a float, for display and ratios.
    pub fn as_f64(&self) -> f64 {
        self.nanos as f64 / NANO as f64
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }
}

/// mantissa * 10^(exp - frac_len), truncated toward zero.
fn scale_decimal(mantissa: i128, frac_len: u32, exp: i32) -> Option<i128> {
    let shift = exp.checked_sub(i32::try_from(frac_len).ok()?)?;
    if shift >= 0 {
        mantissa.checked_mul(10i128.checked_pow(shift as u32)?)
    } else {
        let divisor = 10i128.checked_pow(shift.unsigned_abs());
        Some(divisor.map(|d| mantissa / d).unwrap_or(0))
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity {
            nanos: self.nanos.saturating_add(rhs.nanos),
        }
    }
}

impl std::iter::Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, |acc, q| acc + q)
    }
}

impl FromStr for Quantity {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos % NANO == 0 {
            write!(f, "{}", self.nanos / NANO)
        } else if self.nanos % 1_000_000 == 0 {
            write!(f, "{}m", self.nanos / 1_000_000)
        } else {
            write!(f, "{}n", self.nanos)
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Kubernetes serializes quantities as strings, but integers show up in hand-written fixtures
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Quantity::parse(&s).map_err(serde::de::Error::custom),
            Raw::Int(i) => Ok(Quantity::from_units(i)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_binary_suffixes() {
        assert_eq!(Quantity::parse("128Mi").unwrap().as_i64(), Some(128 * 1024 * 1024));
        assert_eq!(Quantity::parse("1Gi").unwrap().as_i64(), Some(1024 * 1024 * 1024));
        assert_eq!(Quantity::parse("1024Ki").unwrap().as_i64(), Some(1024 * 1024));
        assert_eq!(Quantity::parse("1.5Gi").unwrap().as_i64(), Some(1610612736));
    }

    #[test]
    fn test_decimal_suffixes() {
        assert_eq!(Quantity::parse("1000000000").unwrap().as_i64(), Some(1_000_000_000));
        assert_eq!(Quantity::parse("2k").unwrap().as_i64(), Some(2000));
        assert_eq!(Quantity::parse("3G").unwrap().as_i64(), Some(3_000_000_000));
        assert_eq!(Quantity::parse("1e3").unwrap().as_i64(), Some(1000));
        assert_eq!(Quantity::parse("1.5E2").unwrap().as_i64(), Some(150));
    }

    #[test]
    fn test_fractional_units() {
        assert_eq!(Quantity::parse("100m").unwrap().as_milli(), 100);
        assert_eq!(Quantity::parse("0.5").unwrap().as_milli(), 500);
        assert_eq!(Quantity::parse(".25").unwrap().as_milli(), 250);
        assert_eq!(Quantity::parse("250000u").unwrap().as_milli(), 250);
        assert_eq!(Quantity::parse("100m").unwrap().to_string(), "100m");
        assert_eq!(Quantity::parse("4").unwrap().to_string(), "4");
    }

    #[test]
    fn test_ordering_across_suffixes() {
        let a = Quantity::parse("1Gi").unwrap();
        let b = Quantity::parse("1G").unwrap();
        let c = Quantity::parse("1024Mi").unwrap();
        assert!(a > b);
        assert_eq!(a, c);
        assert!(Quantity::parse("500m").unwrap() < Quantity::parse("1").unwrap());
        assert!(Quantity::parse("-1").unwrap() < Quantity::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Quantity = ["1Gi", "512Mi", "512Mi"]
            .iter()
            .map(|s| Quantity::parse(s).unwrap())
            .sum();
        assert_eq!(total, Quantity::parse("2Gi").unwrap());
    }

    #[test]
    fn test_invalid_quantities() {
        for bad in ["", "Gi", "12Zi", "1.2.3", "ten", "5 Gi", "1iB"] {
            let err = Quantity::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidValue, "input {:?}", bad);
        }
    }

    #[test]
    fn test_out_of_range_quantities() {
        let many_fraction_digits = format!("0.{}1Ki", "0".repeat(38));
        for bad in [
            "1e2147483647",
            "0.0000000001e-2147483648",
            many_fraction_digits.as_str(),
            "99999999999999999999999999999999999Ei",
        ] {
            let err = Quantity::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidValue, "input {:?}", bad);
        }
    }

    #[test]
    fn test_deserialize_from_string_or_int() {
        let q: Quantity = serde_json::from_str("\"8Gi\"").unwrap();
        assert_eq!(q, Quantity::parse("8Gi").unwrap());
        let q: Quantity = serde_json::from_str("110").unwrap();
        assert_eq!(q.as_i64(), Some(110));
    }
}
