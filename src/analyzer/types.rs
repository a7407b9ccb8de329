//! Core types shared by every analyzer.
//!
//! - `Outcome` / `SingleOutcome` - one entry of an analyzer's outcome list
//! - `OutcomeKind` - which of fail, warn or pass an outcome represents
//! - `AnalyzeResult` - the verdict produced for one analyzed entity
//! - `AnalyzeMeta` - fields common to every analyzer spec

use crate::analyzer::conditional::parse_bool;
use crate::error::{AnalyzeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict categories, ordered from least to most severe: `Pass < Warn < Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Pass,
    Warn,
    Fail,
}

impl OutcomeKind {
    /// Parse a verdict name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pass" => Some(Self::Pass),
            "warn" | "warning" => Some(Self::Warn),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The body of one outcome variant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SingleOutcome {
    /// When-clause; empty means "always".
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl SingleOutcome {
    pub fn new(when: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            when: when.into(),
            message: message.into(),
            uri: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Whether the when-clause is empty and the outcome always matches.
    pub fn is_unconditional(&self) -> bool {
        self.when.trim().is_empty()
    }
}

/// One entry in an outcome list. Exactly one of the three fields must be set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<SingleOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn: Option<SingleOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<SingleOutcome>,
}

impl Outcome {
    pub fn fail(when: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fail: Some(SingleOutcome::new(when, message)),
            ..Self::default()
        }
    }

    pub fn warn(when: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            warn: Some(SingleOutcome::new(when, message)),
            ..Self::default()
        }
    }

    pub fn pass(when: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pass: Some(SingleOutcome::new(when, message)),
            ..Self::default()
        }
    }

    /// Attach a URI to whichever variant is set.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        for single in [&mut self.fail, &mut self.warn, &mut self.pass].into_iter().flatten() {
            single.uri = Some(uri.clone());
        }
        self
    }

    /// The variant this outcome represents. `index` is the position in the
    /// outcome list, used in error messages.
    pub fn variant(&self, index: usize) -> Result<(OutcomeKind, &SingleOutcome)> {
        let set: Vec<(OutcomeKind, &SingleOutcome)> = [
            (OutcomeKind::Fail, self.fail.as_ref()),
            (OutcomeKind::Warn, self.warn.as_ref()),
            (OutcomeKind::Pass, self.pass.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, single)| single.map(|s| (kind, s)))
        .collect();

        match set.as_slice() {
            [] => Err(AnalyzeError::EmptyOutcome { index }),
            [only] => Ok(*only),
            _ => Err(AnalyzeError::AmbiguousOutcome { index }),
        }
    }
}

/// Reference to the Kubernetes object a result is about.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ObjectReference {
    pub fn node(name: impl Into<String>) -> Self {
        Self {
            kind: "Node".to_string(),
            name: name.into(),
            namespace: None,
        }
    }
}

/// The verdict for one analyzed entity.
///
/// At most one of `is_pass`, `is_warn` and `is_fail` is set. A result with
/// none set is inconclusive: no outcome matched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_key: String,
    #[serde(default, rename = "iconURI", skip_serializing_if = "String::is_empty")]
    pub icon_uri: String,
    #[serde(default)]
    pub is_pass: bool,
    #[serde(default)]
    pub is_warn: bool,
    #[serde(default)]
    pub is_fail: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub involved_object: Option<ObjectReference>,
}

impl AnalyzeResult {
    /// An inconclusive result carrying only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// A result for a matched outcome.
    pub fn from_outcome(title: impl Into<String>, kind: OutcomeKind, outcome: &SingleOutcome) -> Self {
        Self {
            title: title.into(),
            message: outcome.message.clone(),
            uri: outcome.uri.clone().unwrap_or_default(),
            is_pass: kind == OutcomeKind::Pass,
            is_warn: kind == OutcomeKind::Warn,
            is_fail: kind == OutcomeKind::Fail,
            ..Self::default()
        }
    }

    /// A failed result reporting an analyzer error.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_fail: true,
            ..Self::default()
        }
    }

    pub fn with_icon(mut self, key: impl Into<String>, uri: impl Into<String>) -> Self {
        self.icon_key = key.into();
        self.icon_uri = uri.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_involved_object(mut self, object: ObjectReference) -> Self {
        self.involved_object = Some(object);
        self
    }

    /// The verdict, or `None` when inconclusive.
    pub fn verdict(&self) -> Option<OutcomeKind> {
        if self.is_fail {
            Some(OutcomeKind::Fail)
        } else if self.is_warn {
            Some(OutcomeKind::Warn)
        } else if self.is_pass {
            Some(OutcomeKind::Pass)
        } else {
            None
        }
    }

    pub fn is_inconclusive(&self) -> bool {
        self.verdict().is_none()
    }
}

/// A boolean that specs may also write as a string (`"true"`, `"0"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoolOrString {
    Bool(bool),
    String(String),
}

impl BoolOrString {
    /// Resolve to a bool. An empty string is false.
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            Self::String(s) if s.trim().is_empty() => Ok(false),
            Self::String(s) => parse_bool(s.trim()),
        }
    }
}

impl Default for BoolOrString {
    fn default() -> Self {
        Self::Bool(false)
    }
}

impl From<bool> for BoolOrString {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Fields common to every analyzer spec.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<BoolOrString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<BoolOrString>,
}

impl AnalyzeMeta {
    /// The configured check name, or `default` if none was given.
    pub fn title_or(&self, default: &str) -> String {
        match self.check_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default.to_string(),
        }
    }

    pub fn is_excluded(&self) -> Result<bool> {
        self.exclude.as_ref().map_or(Ok(false), |e| e.to_bool())
    }

    pub fn is_strict(&self) -> Result<bool> {
        self.strict.as_ref().map_or(Ok(false), |s| s.to_bool())
    }
}
