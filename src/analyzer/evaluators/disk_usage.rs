//! Host disk usage conditionals.
//!
//! Clauses always name their operand (case-insensitive):
//! - `total`, `used`, `available` compare byte quantities (`available < 10Gi`)
//! - `used/total`, `available/total` compare ratios (`used/total > 80%`, `< 0.2`)
//!
//! A ratio over a zero total is undefined and only satisfies `!=`.

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator, compare_with};
use crate::analyzer::values::{Quantity, parse_fraction};
use crate::error::{AnalyzeError, Result};
use serde::{Deserialize, Serialize};

/// Collected disk usage for one path (`host-collectors/diskUsage/<name>.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskUsageInfo {
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub used_bytes: u64,
}

impl DiskUsageInfo {
    pub fn available_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }

    fn ratio(&self, part: u64) -> f64 {
        if self.total_bytes == 0 {
            f64::NAN
        } else {
            part as f64 / self.total_bytes as f64
        }
    }
}

pub struct DiskUsageEvaluator;

impl Evaluator for DiskUsageEvaluator {
    type Data = DiskUsageInfo;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("diskUsage").case_insensitive()
    }

    fn evaluate_clause(&self, clause: &Conditional, disk: &DiskUsageInfo) -> Result<bool> {
        let op = clause.operator()?;
        let literal = clause.literal.as_str();
        match clause.operand.as_str() {
            "total" => compare_with(op, &Quantity::from_bytes(disk.total_bytes), literal, Quantity::parse),
            "used" => compare_with(op, &Quantity::from_bytes(disk.used_bytes), literal, Quantity::parse),
            "available" => compare_with(op, &Quantity::from_bytes(disk.available_bytes()), literal, Quantity::parse),
            "used/total" => compare_with(op, &disk.ratio(disk.used_bytes), literal, parse_fraction),
            "available/total" => compare_with(op, &disk.ratio(disk.available_bytes()), literal, parse_fraction),
            other => Err(AnalyzeError::unknown_operand("diskUsage", other)),
        }
    }
}
