//! When-clause parsing and the shared evaluator contract.
//!
//! Each data domain (CPU counts, byte quantities, durations, versions, health
//! states, ...) implements [`Evaluator`]: it declares the clause grammar it
//! accepts, resolves the operand against its collected data, parses the literal
//! into the operand's native type, and hands both to
//! [`ComparisonOperator`]. Operator semantics live in exactly one place.

pub mod clause;
pub mod operator;

pub use clause::{ClauseSyntax, Comparator, Conditional, RangeClause};
pub use operator::ComparisonOperator;

use crate::error::{AnalyzeError, Result};
use log::trace;

/// A conditional evaluator for one kind of collected data.
pub trait Evaluator {
    /// Collected data the clause is evaluated against.
    type Data: ?Sized;

    /// Grammar of the when-clauses this evaluator accepts.
    fn syntax(&self) -> ClauseSyntax;

    /// Evaluate an already tokenized clause.
    fn evaluate_clause(&self, clause: &Conditional, data: &Self::Data) -> Result<bool>;

    /// Parse and evaluate a when-clause.
    fn evaluate(&self, when: &str, data: &Self::Data) -> Result<bool> {
        let clause = self.syntax().parse(when)?;
        let matched = self.evaluate_clause(&clause, data)?;
        trace!("{} `{}` => {}", self.syntax().evaluator, clause, matched);
        Ok(matched)
    }
}

/// Parse `literal` with `parse` and compare it against `actual`.
pub fn compare_with<T, F>(op: ComparisonOperator, actual: &T, literal: &str, parse: F) -> Result<bool>
where
    T: PartialOrd,
    F: FnOnce(&str) -> Result<T>,
{
    let desired = parse(literal)?;
    Ok(op.compare_partial(actual, &desired))
}

/// Parse an integer literal.
pub fn parse_int(literal: &str) -> Result<i64> {
    literal
        .parse::<i64>()
        .map_err(|e| AnalyzeError::invalid_value(literal, e.to_string()))
}

/// Parse a boolean literal (`true`/`false`, `1`/`0`, `t`/`f`, any case).
pub fn parse_bool(literal: &str) -> Result<bool> {
    match literal.to_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        _ => Err(AnalyzeError::invalid_value(literal, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Counter;

    impl Evaluator for Counter {
        type Data = i64;

        fn syntax(&self) -> ClauseSyntax {
            ClauseSyntax::new("counter").default_operand("count")
        }

        fn evaluate_clause(&self, clause: &Conditional, data: &i64) -> Result<bool> {
            match clause.operand.as_str() {
                "count" => compare_with(clause.operator()?, data, &clause.literal, parse_int),
                other => Err(AnalyzeError::unknown_operand("counter", other)),
            }
        }
    }

    #[test]
    fn test_generic_evaluation() {
        assert!(Counter.evaluate("count >= 3", &3).unwrap());
        assert!(Counter.evaluate("< 4", &3).unwrap());
        assert!(!Counter.evaluate("!= 3", &3).unwrap());
    }

    #[test]
    fn test_evaluation_errors() {
        assert_eq!(Counter.evaluate("count >= three", &3).unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(Counter.evaluate("total >= 3", &3).unwrap_err().kind(), ErrorKind::UnknownOperand);
        assert_eq!(Counter.evaluate("count is 3", &3).unwrap_err().kind(), ErrorKind::UnknownOperator);
        assert_eq!(Counter.evaluate("3", &3).unwrap_err().kind(), ErrorKind::MalformedConditional);
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let first = Counter.evaluate("count > 2", &3).unwrap();
        let second = Counter.evaluate("count > 2", &3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert_eq!(parse_bool("yes").unwrap_err().kind(), ErrorKind::InvalidValue);
    }
}
