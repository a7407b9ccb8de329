//! Host CPU conditionals.
//!
//! Operands (case-insensitive): `count` (default, the larger of the logical
//! and physical counts), `logical`, `physical`, and `machineArch` (equality
//! only). The keywords `supports <microarch>` and `hasFlags <csv>` test the
//! CPU flag list instead of comparing a number.

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator, compare_with, parse_int};
use crate::error::{AnalyzeError, Result};
use serde::{Deserialize, Serialize};

/// Collected CPU facts (`host-collectors/system/cpu.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    #[serde(default)]
    pub logical_count: i64,
    #[serde(default)]
    pub physical_count: i64,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub machine_arch: String,
}

/// x86-64 microarchitecture levels. Each level also requires every flag of
/// the levels before it.
const MICROARCH_LEVELS: &[(&str, &[&str])] = &[
    ("x86-64", &[]),
    ("x86-64-v2", &["cx16", "lahf_lm", "popcnt", "sse4_1", "sse4_2", "ssse3"]),
    (
        "x86-64-v3",
        &["avx", "avx2", "bmi1", "bmi2", "f16c", "fma", "abm", "movbe", "xsave"],
    ),
    ("x86-64-v4", &["avx512f", "avx512bw", "avx512cd", "avx512dq", "avx512vl"]),
];

/// All flags required by a microarchitecture level, or `None` if unknown.
pub fn microarch_flags(microarch: &str) -> Option<Vec<&'static str>> {
    let level = MICROARCH_LEVELS.iter().position(|(name, _)| *name == microarch)?;
    Some(
        MICROARCH_LEVELS[..=level]
            .iter()
            .flat_map(|(_, flags)| flags.iter().copied())
            .collect(),
    )
}

fn supports(microarch: &str, flags: &[String]) -> Result<bool> {
    let required = microarch_flags(microarch)
        .ok_or_else(|| AnalyzeError::invalid_value(microarch, "unsupported microarchitecture"))?;
    Ok(required.iter().all(|flag| flags.iter().any(|f| f == flag)))
}

fn has_flags(expected: &str, flags: &[String]) -> Result<bool> {
    let expected: Vec<&str> = expected.split(',').collect();
    if expected.iter().any(|f| f.is_empty()) {
        return Err(AnalyzeError::invalid_value(
            expected.join(","),
            "expected a comma separated list of flags",
        ));
    }
    Ok(expected.iter().all(|flag| flags.iter().any(|f| f == flag)))
}

pub struct CpuEvaluator;

impl Evaluator for CpuEvaluator {
    type Data = CpuInfo;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("cpu")
            .default_operand("count")
            .case_insensitive()
            .keywords(&["supports", "hasFlags"])
    }

    fn evaluate_clause(&self, clause: &Conditional, cpu: &CpuInfo) -> Result<bool> {
        match clause.keyword() {
            Some("supports") => return supports(&clause.literal, &cpu.flags),
            Some(_) => return has_flags(&clause.literal, &cpu.flags),
            None => {}
        }

        let op = clause.operator()?;
        match clause.operand.as_str() {
            "count" => {
                let count = cpu.logical_count.max(cpu.physical_count);
                compare_with(op, &count, &clause.literal, parse_int)
            }
            "logical" => compare_with(op, &cpu.logical_count, &clause.literal, parse_int),
            "physical" => compare_with(op, &cpu.physical_count, &clause.literal, parse_int),
            "machinearch" => op.compare_eq(cpu.machine_arch.as_str(), clause.literal.as_str(), "machineArch"),
            other => Err(AnalyzeError::unknown_operand("cpu", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn cpu(logical: i64, physical: i64) -> CpuInfo {
        CpuInfo {
            logical_count: logical,
            physical_count: physical,
            flags: vec![],
            machine_arch: "x86_64".to_string(),
        }
    }

    fn with_flags(flags: &[&str]) -> CpuInfo {
        CpuInfo {
            flags: flags.iter().map(|f| f.to_string()).collect(),
            ..cpu(4, 2)
        }
    }

    #[test]
    fn test_count_boundaries() {
        let eight = cpu(8, 4);
        assert!(!CpuEvaluator.evaluate("< 8", &eight).unwrap());
        assert!(CpuEvaluator.evaluate("<= 8", &eight).unwrap());
        assert!(!CpuEvaluator.evaluate("> 8", &eight).unwrap());
        assert!(CpuEvaluator.evaluate(">= 8", &eight).unwrap());
        assert!(CpuEvaluator.evaluate("count == 8", &eight).unwrap());
        assert!(CpuEvaluator.evaluate("count === 8", &eight).unwrap());
    }

    #[test]
    fn test_count_uses_larger_of_logical_and_physical() {
        assert!(CpuEvaluator.evaluate("count == 6", &cpu(4, 6)).unwrap());
        assert!(CpuEvaluator.evaluate("logical == 4", &cpu(4, 6)).unwrap());
        assert!(CpuEvaluator.evaluate("Physical >= 6", &cpu(4, 6)).unwrap());
    }

    #[test]
    fn test_machine_arch_is_equality_only() {
        let c = cpu(2, 2);
        assert!(CpuEvaluator.evaluate("machineArch == x86_64", &c).unwrap());
        assert!(CpuEvaluator.evaluate("machinearch != arm64", &c).unwrap());
        let err = CpuEvaluator.evaluate("machineArch < x86_64", &c).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperator);
    }

    #[test]
    fn test_supports_microarch() {
        let v2 = ["cx16", "lahf_lm", "popcnt", "sse4_1", "sse4_2", "ssse3"];
        let c = with_flags(&v2);
        assert!(CpuEvaluator.evaluate("supports x86-64", &c).unwrap());
        assert!(CpuEvaluator.evaluate("supports x86-64-v2", &c).unwrap());
        assert!(!CpuEvaluator.evaluate("supports x86-64-v3", &c).unwrap());

        let err = CpuEvaluator.evaluate("supports armv8", &c).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_microarch_levels_are_cumulative() {
        let v4 = microarch_flags("x86-64-v4").unwrap();
        assert!(v4.contains(&"cx16"));
        assert!(v4.contains(&"avx2"));
        assert!(v4.contains(&"avx512vl"));
        assert!(microarch_flags("x86-64").unwrap().is_empty());
    }

    #[test]
    fn test_has_flags() {
        let c = with_flags(&["sse4_2", "avx", "avx2"]);
        assert!(CpuEvaluator.evaluate("hasFlags avx,avx2", &c).unwrap());
        assert!(!CpuEvaluator.evaluate("hasFlags avx,avx512f", &c).unwrap());
        assert_eq!(
            CpuEvaluator.evaluate("hasFlags avx,,avx2", &c).unwrap_err().kind(),
            ErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let c = with_flags(&["avx"]);
        let err = CpuEvaluator.evaluate("hasflags avx", &c).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOperator);
    }

    #[test]
    fn test_errors() {
        let c = cpu(2, 2);
        assert_eq!(CpuEvaluator.evaluate("cores > 2", &c).unwrap_err().kind(), ErrorKind::UnknownOperand);
        assert_eq!(CpuEvaluator.evaluate("count > two", &c).unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(CpuEvaluator.evaluate("count", &c).unwrap_err().kind(), ErrorKind::MalformedConditional);
    }

    #[test]
    fn test_decode() {
        let json = r#"{"logicalCount": 16, "physicalCount": 8, "flags": ["avx"], "machineArch": "x86_64"}"#;
        let info: CpuInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.logical_count, 16);
        assert_eq!(info.flags, vec!["avx"]);
    }
}
