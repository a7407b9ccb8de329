//! Semantic versions and version ranges.
//!
//! Ranges use the conventional syntax found in analyzer specs:
//! - `>=1.20.0 <1.25.0` (space separated conditions must all hold)
//! - `<1.19.0 || >=1.22.0` (any alternative may hold)
//! - `>= 1.20` (operator separated from the version by a space)
//! - `1.21.3` (bare version means equality)

use crate::analyzer::conditional::ComparisonOperator;
use crate::error::{AnalyzeError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static LEADING_VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.?[0-9]*\.?[0-9]*").unwrap());

/// A prerelease identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Prerelease {
    Numeric(u64),
    Alpha(String),
}

impl Ord for Prerelease {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Alpha(_)) => Ordering::Less,
            (Self::Alpha(_), Self::Numeric(_)) => Ordering::Greater,
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Prerelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Alpha(s) => f.write_str(s),
        }
    }
}

/// A semantic version. Build metadata is discarded since it doesn't take part
/// in precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Vec<Prerelease>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
        }
    }

    /// Parse a strict `MAJOR.MINOR.PATCH[-PRE][+BUILD]` version.
    pub fn parse(s: &str) -> Result<Self> {
        let (core, pre) = split_core(s.trim());
        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(AnalyzeError::invalid_value(s, "expected MAJOR.MINOR.PATCH"));
        }
        Self::from_parts(s, &parts, pre)
    }

    /// Parse a version leniently: a leading `v` is dropped, missing minor and
    /// patch components default to zero, and leading zeros are ignored.
    pub fn parse_tolerant(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        let (core, pre) = split_core(trimmed);
        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(AnalyzeError::invalid_value(s, "expected at most three version components"));
        }
        let mut padded = parts.clone();
        padded.resize(3, "0");
        Self::from_parts(s, &padded, pre)
    }

    /// Parse a version reported by a host, such as a kernel release
    /// (`5.4.0-1045-aws`) or a distribution version (`20.04`, `8.02`).
    /// Only the leading numeric `a.b.c` portion is kept.
    pub fn parse_reported(s: &str) -> Result<Self> {
        let stripped: Vec<&str> = s
            .trim()
            .split('.')
            .map(|part| match part.trim_start_matches('0') {
                "" if !part.is_empty() => "0",
                trimmed => trimmed,
            })
            .collect();
        let joined = stripped.join(".");
        let leading = LEADING_VERSION_REGEX
            .find(&joined)
            .map(|m| m.as_str().trim_end_matches('.'))
            .unwrap_or("");
        if leading.is_empty() {
            return Err(AnalyzeError::invalid_value(s, "no numeric version found"));
        }
        Self::parse_tolerant(leading)
    }

    fn from_parts(original: &str, parts: &[&str], pre: Option<&str>) -> Result<Self> {
        let number = |p: &str| -> Result<u64> {
            p.parse::<u64>()
                .map_err(|_| AnalyzeError::invalid_value(original, format!("invalid version component {:?}", p)))
        };
        let pre = match pre {
            Some(pre) => pre
                .split('.')
                .map(|id| {
                    if id.is_empty() {
                        Err(AnalyzeError::invalid_value(original, "empty prerelease identifier"))
                    } else if id.chars().all(|c| c.is_ascii_digit()) {
                        number(id).map(Prerelease::Numeric)
                    } else {
                        Ok(Prerelease::Alpha(id.to_string()))
                    }
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
            pre,
        })
    }
}

/// Split `1.2.3-rc.1+build` into (`1.2.3`, Some(`rc.1`)).
fn split_core(s: &str) -> (&str, Option<&str>) {
    let without_build = s.split_once('+').map(|(v, _)| v).unwrap_or(s);
    match without_build.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (without_build, None),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // a release sorts after any of its prereleases
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            let pre: Vec<String> = self.pre.iter().map(|p| p.to_string()).collect();
            write!(f, "-{}", pre.join("."))?;
        }
        Ok(())
    }
}

/// One `<op><version>` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    op: ComparisonOperator,
    version: Version,
}

/// A set of alternatives, each a conjunction of conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    alternatives: Vec<Vec<Condition>>,
}

impl VersionRange {
    pub fn parse(s: &str) -> Result<Self> {
        let mut alternatives = Vec::new();
        for alternative in s.split("||") {
            let tokens = merge_operator_tokens(alternative.split_whitespace().collect());
            if tokens.is_empty() {
                return Err(AnalyzeError::invalid_value(s, "empty version range"));
            }
            let conditions = tokens
                .iter()
                .map(|token| parse_condition(s, token))
                .collect::<Result<Vec<_>>>()?;
            alternatives.push(conditions);
        }
        Ok(Self { alternatives })
    }

    /// Whether `version` satisfies the range.
    pub fn contains(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|conds| conds.iter().all(|c| c.op.compare(version, &c.version)))
    }
}

/// Glue a lone operator token onto the version that follows it.
fn merge_operator_tokens(tokens: Vec<&str>) -> Vec<String> {
    let mut merged = Vec::new();
    let mut pending: Option<&str> = None;
    for token in tokens {
        let is_operator = token.chars().all(|c| matches!(c, '<' | '>' | '=' | '!'));
        match pending.take() {
            Some(op) => merged.push(format!("{}{}", op, token)),
            None if is_operator => pending = Some(token),
            None => merged.push(token.to_string()),
        }
    }
    if let Some(op) = pending {
        merged.push(op.to_string());
    }
    merged
}

fn parse_condition(range: &str, token: &str) -> Result<Condition> {
    let split = token
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '!'))
        .unwrap_or(token.len());
    let (op, version) = token.split_at(split);
    let op = match op {
        "" => ComparisonOperator::Equal,
        "!" => ComparisonOperator::NotEqual,
        other => ComparisonOperator::parse(other)
            .map_err(|_| AnalyzeError::invalid_value(range, format!("unknown range operator {:?}", other)))?,
    };
    if version.is_empty() {
        return Err(AnalyzeError::invalid_value(range, format!("missing version after {:?}", token)));
    }
    let version = Version::parse_tolerant(version).map_err(|e| e.wrap(format!("invalid version range {:?}", range)))?;
    Ok(Condition { op, version })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn v(s: &str) -> Version {
        Version::parse_tolerant(s).unwrap()
    }

    #[test]
    fn test_parse_strict() {
        let ver = Version::parse("1.25.3").unwrap();
        assert_eq!((ver.major, ver.minor, ver.patch), (1, 25, 3));
        assert!(Version::parse("1.25").is_err());
        assert!(Version::parse("1.x.0").is_err());

        let ver = Version::parse("1.0.0-rc.1+build.5").unwrap();
        assert_eq!(ver.pre, vec![Prerelease::Alpha("rc".to_string()), Prerelease::Numeric(1)]);
        assert_eq!(ver.to_string(), "1.0.0-rc.1");
    }

    #[test]
    fn test_parse_tolerant() {
        assert_eq!(v("v1.21"), Version::new(1, 21, 0));
        assert_eq!(v("14"), Version::new(14, 0, 0));
        assert_eq!(v("08.02.0"), Version::new(8, 2, 0));
        assert!(Version::parse_tolerant("1.2.3.4").is_err());
    }

    #[test]
    fn test_parse_reported() {
        assert_eq!(Version::parse_reported("5.4.0-1045-aws").unwrap(), Version::new(5, 4, 0));
        assert_eq!(Version::parse_reported("20.04").unwrap(), Version::new(20, 4, 0));
        assert_eq!(Version::parse_reported("4.18.0-305.el8.x86_64").unwrap(), Version::new(4, 18, 0));
        assert!(Version::parse_reported("rolling").is_err());
    }

    #[test]
    fn test_precedence() {
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") < v("1.0.0-alpha.beta"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
        assert!(v("1.9.0") < v("1.10.0"));
    }

    #[test]
    fn test_range_conjunction() {
        let range = VersionRange::parse(">=1.20.0 <1.25.0").unwrap();
        assert!(range.contains(&v("1.20.0")));
        assert!(range.contains(&v("1.24.9")));
        assert!(!range.contains(&v("1.25.0")));
        assert!(!range.contains(&v("1.19.7")));
    }

    #[test]
    fn test_range_disjunction_and_spacing() {
        let range = VersionRange::parse("< 1.19 || >= 1.22").unwrap();
        assert!(range.contains(&v("1.18.2")));
        assert!(range.contains(&v("1.22.0")));
        assert!(!range.contains(&v("1.20.0")));

        let exact = VersionRange::parse("1.21.3").unwrap();
        assert!(exact.contains(&v("1.21.3")));
        assert!(!exact.contains(&v("1.21.4")));

        let not = VersionRange::parse("!1.21.3").unwrap();
        assert!(not.contains(&v("1.21.4")));
    }

    #[test]
    fn test_invalid_ranges() {
        for bad in ["", ">=", ">= || <1.0", "~1.2.3", ">=one", "=>1.2.0"] {
            let err = VersionRange::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidValue, "range {:?}", bad);
        }
    }
}
