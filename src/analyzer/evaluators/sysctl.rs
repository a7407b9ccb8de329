//! Kernel parameter conditionals: `net.ipv4.ip_forward = 1`,
//! `vm.max_map_count >= 262144`.
//!
//! The operand is the parameter name, matched exactly. Equality compares the
//! collected string as-is; ordering operators need both sides to be integers.

use crate::analyzer::conditional::{ClauseSyntax, ComparisonOperator, Conditional, Evaluator, parse_int};
use crate::error::{AnalyzeError, Result};
use std::collections::BTreeMap;

/// Collected kernel parameters, name to value.
pub type SysctlParams = BTreeMap<String, String>;

pub struct SysctlEvaluator;

impl Evaluator for SysctlEvaluator {
    type Data = SysctlParams;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("sysctl")
    }

    fn evaluate_clause(&self, clause: &Conditional, params: &SysctlParams) -> Result<bool> {
        let op = clause.operator()?;
        let actual = params
            .get(&clause.operand)
            .ok_or_else(|| AnalyzeError::unknown_operand("sysctl", clause.operand.as_str()))?;

        match op {
            ComparisonOperator::Equal => Ok(actual.trim() == clause.literal),
            ComparisonOperator::NotEqual => Ok(actual.trim() != clause.literal),
            _ => {
                let actual: i64 = actual.trim().parse().map_err(|_| {
                    AnalyzeError::invalid_value(
                        actual.as_str(),
                        format!("kernel parameter {} is not an integer, cannot use {}", clause.operand, op),
                    )
                })?;
                Ok(op.compare(&actual, &parse_int(&clause.literal)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn params() -> SysctlParams {
        [
            ("net.ipv4.ip_forward", "1"),
            ("vm.max_map_count", "65530"),
            ("kernel.hostname", "worker-1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_string_equality() {
        let p = params();
        assert!(SysctlEvaluator.evaluate("net.ipv4.ip_forward = 1", &p).unwrap());
        assert!(SysctlEvaluator.evaluate("kernel.hostname == worker-1", &p).unwrap());
        assert!(SysctlEvaluator.evaluate("kernel.hostname != worker-2", &p).unwrap());
        // equality is textual
        assert!(!SysctlEvaluator.evaluate("net.ipv4.ip_forward = 01", &p).unwrap());
    }

    #[test]
    fn test_integer_ordering() {
        let p = params();
        assert!(SysctlEvaluator.evaluate("vm.max_map_count < 262144", &p).unwrap());
        assert!(SysctlEvaluator.evaluate("vm.max_map_count >= 65530", &p).unwrap());
    }

    #[test]
    fn test_errors() {
        let p = params();
        let err = SysctlEvaluator.evaluate("kernel.hostname > 3", &p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        let err = SysctlEvaluator.evaluate("vm.max_map_count > lots", &p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        let err = SysctlEvaluator.evaluate("vm.swappiness > 10", &p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOperand);
        // operand names are case-sensitive
        let err = SysctlEvaluator.evaluate("VM.MAX_MAP_COUNT > 10", &p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOperand);
    }
}
