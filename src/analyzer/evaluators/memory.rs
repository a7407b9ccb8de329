//! Host memory conditionals. The only operand is `total` (the default),
//! compared as a byte quantity: `total >= 8Gi`, `< 4G`.

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator, compare_with};
use crate::analyzer::values::Quantity;
use crate::error::{AnalyzeError, Result};
use serde::{Deserialize, Serialize};

/// Collected memory facts (`host-collectors/system/memory.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total memory in bytes.
    #[serde(default)]
    pub total: u64,
}

pub struct MemoryEvaluator;

impl Evaluator for MemoryEvaluator {
    type Data = MemoryInfo;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("memory").default_operand("total").case_insensitive()
    }

    fn evaluate_clause(&self, clause: &Conditional, memory: &MemoryInfo) -> Result<bool> {
        match clause.operand.as_str() {
            "total" => compare_with(
                clause.operator()?,
                &Quantity::from_bytes(memory.total),
                &clause.literal,
                Quantity::parse,
            ),
            other => Err(AnalyzeError::unknown_operand("memory", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const EIGHT_GI: u64 = 8 * 1024 * 1024 * 1024;

    #[test]
    fn test_total_with_suffixes() {
        let mem = MemoryInfo { total: EIGHT_GI };
        assert!(MemoryEvaluator.evaluate(">= 8Gi", &mem).unwrap());
        assert!(MemoryEvaluator.evaluate("total > 8G", &mem).unwrap());
        assert!(!MemoryEvaluator.evaluate("TOTAL < 8Gi", &mem).unwrap());
        assert!(MemoryEvaluator.evaluate("== 8589934592", &mem).unwrap());
    }

    #[test]
    fn test_errors() {
        let mem = MemoryInfo { total: EIGHT_GI };
        assert_eq!(MemoryEvaluator.evaluate("> 8GB", &mem).unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(MemoryEvaluator.evaluate("free > 1Gi", &mem).unwrap_err().kind(), ErrorKind::UnknownOperand);
    }
}
