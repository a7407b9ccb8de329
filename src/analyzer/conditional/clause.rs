//! Tokenizing when-clauses into a typed form.
//!
//! A clause is one of:
//! - `<operand> <operator> <value>`
//! - `<operator> <value>` (the evaluator's default operand is implied)
//! - `<value>` (implicit equality against the default operand, where allowed)
//!
//! Evaluators describe which of these they accept with a [`ClauseSyntax`].

use super::operator::ComparisonOperator;
use crate::error::{AnalyzeError, Result};
use std::fmt;

/// The middle token of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparator {
    /// A comparison operator such as `>=`.
    Operator(ComparisonOperator),
    /// A non-comparison keyword recognised by the evaluator (e.g. `supports`).
    Keyword(&'static str),
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator(op) => write!(f, "{}", op),
            Self::Keyword(kw) => f.write_str(kw),
        }
    }
}

/// A parsed when-clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    /// The resolved left-hand operand name.
    pub operand: String,
    /// Whether the operand was written in the clause rather than implied.
    pub explicit_operand: bool,
    pub comparator: Comparator,
    /// The right-hand literal, unparsed.
    pub literal: String,
}

impl Conditional {
    /// The comparison operator, or `UnknownOperator` if the clause used a keyword.
    pub fn operator(&self) -> Result<ComparisonOperator> {
        match &self.comparator {
            Comparator::Operator(op) => Ok(*op),
            Comparator::Keyword(kw) => Err(AnalyzeError::UnknownOperator((*kw).to_string())),
        }
    }

    /// The keyword, if the clause used one.
    pub fn keyword(&self) -> Option<&'static str> {
        match &self.comparator {
            Comparator::Keyword(kw) => Some(*kw),
            Comparator::Operator(_) => None,
        }
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.operand, self.comparator, self.literal)
    }
}

/// Grammar accepted by one evaluator.
#[derive(Debug, Clone, Copy)]
pub struct ClauseSyntax {
    pub evaluator: &'static str,
    default_operand: Option<&'static str>,
    bare_literal: bool,
    explicit_operand: bool,
    fold_operand_case: bool,
    keywords: &'static [&'static str],
}

impl ClauseSyntax {
    /// Three-token clauses only, case-sensitive operands, no keywords.
    pub const fn new(evaluator: &'static str) -> Self {
        Self {
            evaluator,
            default_operand: None,
            bare_literal: false,
            explicit_operand: true,
            fold_operand_case: false,
            keywords: &[],
        }
    }

    /// Accept `<operator> <value>` with `operand` implied.
    pub const fn default_operand(mut self, operand: &'static str) -> Self {
        self.default_operand = Some(operand);
        self
    }

    /// Accept a bare `<value>` meaning `<default operand> == <value>`.
    pub const fn bare_literal(mut self) -> Self {
        self.bare_literal = true;
        self
    }

    /// Reject clauses that name an operand explicitly.
    pub const fn implicit_operand_only(mut self) -> Self {
        self.explicit_operand = false;
        self
    }

    /// Lower-case operands before they reach the evaluator.
    pub const fn case_insensitive(mut self) -> Self {
        self.fold_operand_case = true;
        self
    }

    /// Keywords allowed in operator position. Matched exactly.
    pub const fn keywords(mut self, keywords: &'static [&'static str]) -> Self {
        self.keywords = keywords;
        self
    }

    /// Split and classify a when-clause.
    pub fn parse(&self, when: &str) -> Result<Conditional> {
        let tokens: Vec<&str> = when.split_whitespace().collect();

        match (tokens.as_slice(), self.default_operand) {
            ([literal], Some(default)) if self.bare_literal => Ok(Conditional {
                operand: default.to_string(),
                explicit_operand: false,
                comparator: Comparator::Operator(ComparisonOperator::Equal),
                literal: (*literal).to_string(),
            }),
            ([comparator, literal], Some(default)) => Ok(Conditional {
                operand: default.to_string(),
                explicit_operand: false,
                comparator: self.parse_comparator(comparator)?,
                literal: (*literal).to_string(),
            }),
            ([operand, comparator, literal], _) if self.explicit_operand => Ok(Conditional {
                operand: self.normalize_operand(operand),
                explicit_operand: true,
                comparator: self.parse_comparator(comparator)?,
                literal: (*literal).to_string(),
            }),
            _ => Err(AnalyzeError::malformed(
                when,
                format!(
                    "{} conditional expects {}, got {} token(s)",
                    self.evaluator,
                    self.describe_forms(),
                    tokens.len()
                ),
            )),
        }
    }

    fn parse_comparator(&self, token: &str) -> Result<Comparator> {
        if let Some(kw) = self.keywords.iter().find(|kw| **kw == token) {
            return Ok(Comparator::Keyword(*kw));
        }
        ComparisonOperator::parse(token).map(Comparator::Operator)
    }

    fn normalize_operand(&self, operand: &str) -> String {
        if self.fold_operand_case {
            operand.to_lowercase()
        } else {
            operand.to_string()
        }
    }

    fn describe_forms(&self) -> String {
        let mut forms = Vec::new();
        if self.bare_literal && self.default_operand.is_some() {
            forms.push("1");
        }
        if self.default_operand.is_some() {
            forms.push("2");
        }
        if self.explicit_operand {
            forms.push("3");
        }
        format!("{} token(s)", forms.join(" or "))
    }
}

/// A clause whose right-hand side is a version range, e.g.
/// `kernelVersion >= 5.4 < 6.0` or `version >=14.0.0 || =13.2.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeClause {
    pub operand: String,
    pub range: String,
}

impl RangeClause {
    pub fn parse(when: &str) -> Result<Self> {
        let trimmed = when.trim();
        let (operand, rest) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| AnalyzeError::malformed(when, "expected an operand followed by a version range"))?;
        let range = rest.trim();
        if range.is_empty() {
            return Err(AnalyzeError::malformed(when, "missing version range"));
        }
        Ok(Self {
            operand: operand.to_string(),
            range: range.to_string(),
        })
    }
}
