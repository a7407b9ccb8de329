//! Filesystem write-latency conditionals.
//!
//! The operand names a statistic of the fsync latency distribution
//! (case-insensitive): `min`, `max`, `average`, or a percentile `p1` through
//! `p9999`. The literal is a duration: `p99 < 10ms`, `average >= 1.5ms`.

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator, compare_with};
use crate::analyzer::values::{format_duration, parse_duration};
use crate::error::{AnalyzeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{\s*\.(\w+)\s*\}\}").unwrap());

/// Collected latency distribution, every field in nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FsPerfResults {
    pub min: u64,
    pub max: u64,
    pub average: u64,
    pub p1: u64,
    pub p5: u64,
    pub p10: u64,
    pub p20: u64,
    pub p30: u64,
    pub p40: u64,
    pub p50: u64,
    pub p60: u64,
    pub p70: u64,
    pub p80: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
    pub p995: u64,
    pub p999: u64,
    pub p9995: u64,
    pub p9999: u64,
}

impl FsPerfResults {
    /// Look up a statistic by its operand name.
    pub fn statistic(&self, name: &str) -> Option<Duration> {
        let nanos = match name {
            "min" => self.min,
            "max" => self.max,
            "average" => self.average,
            "p1" => self.p1,
            "p5" => self.p5,
            "p10" => self.p10,
            "p20" => self.p20,
            "p30" => self.p30,
            "p40" => self.p40,
            "p50" => self.p50,
            "p60" => self.p60,
            "p70" => self.p70,
            "p80" => self.p80,
            "p90" => self.p90,
            "p95" => self.p95,
            "p99" => self.p99,
            "p995" => self.p995,
            "p999" => self.p999,
            "p9995" => self.p9995,
            "p9999" => self.p9999,
            _ => return None,
        };
        Some(Duration::from_nanos(nanos))
    }

    /// One-line summary used when reporting results.
    pub fn summary(&self) -> String {
        format!(
            "min {}, average {}, p99 {}, max {}",
            format_duration(Duration::from_nanos(self.min)),
            format_duration(Duration::from_nanos(self.average)),
            format_duration(Duration::from_nanos(self.p99)),
            format_duration(Duration::from_nanos(self.max)),
        )
    }

    /// Fill `{{ .P99 }}`-style placeholders in an outcome message with the
    /// matching statistic. Unknown names are left untouched.
    pub fn render_message(&self, message: &str) -> String {
        PLACEHOLDER_REGEX
            .replace_all(message, |caps: &regex::Captures<'_>| {
                match self.statistic(&caps[1].to_lowercase()) {
                    Some(value) => format_duration(value),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

pub struct FilesystemPerformanceEvaluator;

impl Evaluator for FilesystemPerformanceEvaluator {
    type Data = FsPerfResults;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("filesystemPerformance").case_insensitive()
    }

    fn evaluate_clause(&self, clause: &Conditional, perf: &FsPerfResults) -> Result<bool> {
        let actual = perf
            .statistic(&clause.operand)
            .ok_or_else(|| AnalyzeError::unknown_operand("filesystemPerformance", clause.operand.as_str()))?;
        compare_with(clause.operator()?, &actual, &clause.literal, parse_duration)
    }
}
