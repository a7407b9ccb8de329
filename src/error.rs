//! Error types for bundle analysis.
//!
//! Every failure raised while evaluating a when-clause or resolving an outcome
//! list maps onto one [`ErrorKind`]. Errors pick up context (which clause, which
//! collected file) as they travel up to the analyzer, the same way the
//! analyzers wrap I/O and decode errors.

use std::fmt;
use thiserror::Error;

/// Classification of analysis errors, independent of the context they carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownOperator,
    MalformedConditional,
    UnknownOperand,
    InvalidValue,
    UnsupportedOperator,
    EmptyOutcome,
    AmbiguousOutcome,
    NotFound,
    Decode,
    Io,
    Spec,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnknownOperator => "unknown operator",
            Self::MalformedConditional => "malformed conditional",
            Self::UnknownOperand => "unknown operand",
            Self::InvalidValue => "invalid value",
            Self::UnsupportedOperator => "unsupported operator",
            Self::EmptyOutcome => "empty outcome",
            Self::AmbiguousOutcome => "ambiguous outcome",
            Self::NotFound => "not found",
            Self::Decode => "decode error",
            Self::Io => "i/o error",
            Self::Spec => "invalid analyzer spec",
            Self::Config => "configuration error",
        };
        f.write_str(s)
    }
}

/// Errors produced by evaluators, the outcome resolver and analyzers.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// An operator token doesn't match any recognized spelling.
    #[error("unknown comparison operator {0:?}")]
    UnknownOperator(String),

    /// Wrong token count or shape in a when-clause.
    #[error("malformed conditional {when:?}: {reason}")]
    MalformedConditional { when: String, reason: String },

    /// Operand keyword not recognized by the evaluator.
    #[error("unknown {evaluator} operand {operand:?}")]
    UnknownOperand {
        evaluator: &'static str,
        operand: String,
    },

    /// The right-hand literal could not be parsed into the expected type.
    #[error("invalid value {value:?}: {reason}")]
    InvalidValue { value: String, reason: String },

    /// Operator is valid but meaningless for the resolved type.
    #[error("operator {operator:?} is not supported for {target}")]
    UnsupportedOperator { operator: String, target: String },

    /// An outcome with none of fail, warn or pass set.
    #[error("outcome #{index} has none of fail, warn or pass set")]
    EmptyOutcome { index: usize },

    /// An outcome with more than one of fail, warn or pass set.
    #[error("outcome #{index} sets more than one of fail, warn or pass")]
    AmbiguousOutcome { index: usize },

    /// The collected artifact does not exist in the bundle.
    #[error("collected file {0:?} not found")]
    NotFound(String),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid analyzer spec: {0}")]
    Spec(String),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Another error wrapped with a description of what was being attempted.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<AnalyzeError>,
    },
}

impl AnalyzeError {
    pub fn malformed(when: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedConditional {
            when: when.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_operand(evaluator: &'static str, operand: impl Into<String>) -> Self {
        Self::UnknownOperand {
            evaluator,
            operand: operand.into(),
        }
    }

    pub fn invalid_value(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_operator(operator: impl fmt::Display, target: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.to_string(),
            target: target.into(),
        }
    }

    pub fn decode(what: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Decode {
            what: what.into(),
            reason: err.to_string(),
        }
    }

    /// The kind of the innermost error, looking through context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOperator(_) => ErrorKind::UnknownOperator,
            Self::MalformedConditional { .. } => ErrorKind::MalformedConditional,
            Self::UnknownOperand { .. } => ErrorKind::UnknownOperand,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::UnsupportedOperator { .. } => ErrorKind::UnsupportedOperator,
            Self::EmptyOutcome { .. } => ErrorKind::EmptyOutcome,
            Self::AmbiguousOutcome { .. } => ErrorKind::AmbiguousOutcome,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Io(_) => ErrorKind::Io,
            Self::Spec(_) => ErrorKind::Spec,
            Self::Config(_) => ErrorKind::Config,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Whether this error means "the artifact isn't in the bundle".
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Wrap this error with a context message.
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Attach context to the error side of a result.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: Into<AnalyzeError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().wrap(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.into().wrap(f()))
    }
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_sees_through_context() {
        let err = AnalyzeError::UnknownOperator("~=".to_string())
            .wrap("failed to compare \"count ~= 2\"")
            .wrap("failed to evaluate outcomes");
        assert_eq!(err.kind(), ErrorKind::UnknownOperator);
        assert_eq!(
            err.to_string(),
            "failed to evaluate outcomes: failed to compare \"count ~= 2\": unknown comparison operator \"~=\""
        );
    }

    #[test]
    fn test_not_found_detection() {
        let err: Result<()> = Err(AnalyzeError::NotFound("ceph/status.json".to_string()));
        let err = err.context("failed to read ceph status").unwrap_err();
        assert!(err.is_not_found());

        let other = AnalyzeError::invalid_value("12Zi", "unknown suffix");
        assert!(!other.is_not_found());
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::other("disk on fire");
        let res: std::result::Result<(), std::io::Error> = Err(io);
        let err = res.with_context(|| "reading bundle").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
