//! Comparison operators used in when-clauses.

use crate::error::{AnalyzeError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A comparison between a collected value and the literal of a when-clause.
///
/// `=`, `==` and `===` all spell [`Equal`](Self::Equal); `!=` and `!==` spell
/// [`NotEqual`](Self::NotEqual).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    /// Parse an operator token.
    pub fn parse(token: &str) -> Result<Self> {
        match token.trim() {
            "=" | "==" | "===" => Ok(Self::Equal),
            "!=" | "!==" => Ok(Self::NotEqual),
            "<" => Ok(Self::LessThan),
            "<=" => Ok(Self::LessThanOrEqual),
            ">" => Ok(Self::GreaterThan),
            ">=" => Ok(Self::GreaterThanOrEqual),
            other => Err(AnalyzeError::UnknownOperator(other.to_string())),
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    /// Whether the operator only tests (in)equality.
    pub fn is_equality(&self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    /// Apply the operator to the result of `actual.cmp(desired)`.
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::LessThan => ordering == Ordering::Less,
            Self::LessThanOrEqual => ordering != Ordering::Greater,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }

    /// Compare two totally ordered values.
    pub fn compare<T: Ord + ?Sized>(&self, actual: &T, desired: &T) -> bool {
        self.matches(actual.cmp(desired))
    }

    /// Compare two partially ordered values. Unordered pairs (NaN) only
    /// satisfy `!=`.
    pub fn compare_partial<T: PartialOrd + ?Sized>(&self, actual: &T, desired: &T) -> bool {
        match actual.partial_cmp(desired) {
            Some(ordering) => self.matches(ordering),
            None => *self == Self::NotEqual,
        }
    }

    /// Compare two values that only support equality. Ordering operators fail
    /// with `UnsupportedOperator`, naming `target` in the message.
    pub fn compare_eq<T: PartialEq + ?Sized>(
        &self,
        actual: &T,
        desired: &T,
        target: &str,
    ) -> Result<bool> {
        match self {
            Self::Equal => Ok(actual == desired),
            Self::NotEqual => Ok(actual != desired),
            _ => Err(AnalyzeError::unsupported_operator(self, target)),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComparisonOperator {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_equality_aliases() {
        for token in ["=", "==", "==="] {
            assert_eq!(ComparisonOperator::parse(token).unwrap(), ComparisonOperator::Equal);
        }
        for token in ["!=", "!=="] {
            assert_eq!(ComparisonOperator::parse(token).unwrap(), ComparisonOperator::NotEqual);
        }
    }

    #[test]
    fn test_ordering_tokens() {
        assert_eq!(ComparisonOperator::parse("<").unwrap(), ComparisonOperator::LessThan);
        assert_eq!(ComparisonOperator::parse("<=").unwrap(), ComparisonOperator::LessThanOrEqual);
        assert_eq!(ComparisonOperator::parse(">").unwrap(), ComparisonOperator::GreaterThan);
        assert_eq!(ComparisonOperator::parse(">=").unwrap(), ComparisonOperator::GreaterThanOrEqual);
        assert_eq!(ComparisonOperator::parse(" >= ").unwrap(), ComparisonOperator::GreaterThanOrEqual);
    }

    #[test]
    fn test_unknown_tokens() {
        for token in ["", "=>", "<>", "====", "eq", "supports"] {
            let err = ComparisonOperator::parse(token).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownOperator, "token {:?}", token);
        }
        let err = ComparisonOperator::parse("~").unwrap_err();
        assert!(err.to_string().contains("\"~\""));
    }

    #[test]
    fn test_boundaries() {
        use ComparisonOperator::*;
        assert!(!LessThan.compare(&8, &8));
        assert!(LessThanOrEqual.compare(&8, &8));
        assert!(!GreaterThan.compare(&8, &8));
        assert!(GreaterThanOrEqual.compare(&8, &8));
        assert!(Equal.compare(&8, &8));
        assert!(!NotEqual.compare(&8, &8));
        assert!(LessThan.compare(&7, &8));
        assert!(GreaterThan.compare(&9, &8));
    }

    #[test]
    fn test_nan_never_orders() {
        use ComparisonOperator::*;
        let nan = f64::NAN;
        assert!(!LessThan.compare_partial(&nan, &0.5));
        assert!(!GreaterThanOrEqual.compare_partial(&nan, &0.5));
        assert!(!Equal.compare_partial(&nan, &nan));
        assert!(NotEqual.compare_partial(&nan, &0.5));
    }

    #[test]
    fn test_equality_only_types() {
        use ComparisonOperator::*;
        assert!(Equal.compare_eq("amd64", "amd64", "machineArch").unwrap());
        assert!(NotEqual.compare_eq("amd64", "arm64", "machineArch").unwrap());
        let err = LessThan.compare_eq("amd64", "arm64", "machineArch").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperator);
    }
}
