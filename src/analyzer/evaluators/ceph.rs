//! Ceph cluster health conditionals.
//!
//! Health states are ordered by severity, `HEALTH_OK < HEALTH_WARN <
//! HEALTH_ERR`. A clause is either a bare state (`HEALTH_OK`, meaning
//! equality) or `<op> <state>` such as `>= HEALTH_WARN` ("warn or worse").

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator};
use crate::analyzer::types::Outcome;
use crate::error::{AnalyzeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Troubleshooting guide linked from the default warn and fail outcomes.
pub const CEPH_ISSUES_URI: &str = "https://rook.io/docs/rook/v1.4/ceph-common-issues.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CephHealth {
    Ok,
    Warn,
    Error,
}

impl CephHealth {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "HEALTH_OK" => Ok(Self::Ok),
            "HEALTH_WARN" => Ok(Self::Warn),
            "HEALTH_ERR" => Ok(Self::Error),
            other => Err(AnalyzeError::invalid_value(
                other,
                "expected HEALTH_OK, HEALTH_WARN or HEALTH_ERR",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "HEALTH_OK",
            Self::Warn => "HEALTH_WARN",
            Self::Error => "HEALTH_ERR",
        }
    }
}

impl fmt::Display for CephHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CephHealth {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Outcomes used when an analyzer spec doesn't list any.
pub fn default_outcomes() -> Vec<Outcome> {
    vec![
        Outcome::pass("HEALTH_OK", "Ceph is healthy"),
        Outcome::warn("HEALTH_WARN", "Ceph status is HEALTH_WARN").with_uri(CEPH_ISSUES_URI),
        Outcome::fail("HEALTH_ERR", "Ceph status is HEALTH_ERR").with_uri(CEPH_ISSUES_URI),
    ]
}

pub struct CephStatusEvaluator;

impl Evaluator for CephStatusEvaluator {
    type Data = CephHealth;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("cephStatus")
            .default_operand("status")
            .bare_literal()
            .implicit_operand_only()
    }

    fn evaluate_clause(&self, clause: &Conditional, actual: &CephHealth) -> Result<bool> {
        let desired = CephHealth::parse(&clause.literal)?;
        Ok(clause.operator()?.compare(actual, &desired))
    }
}

/// Evaluate a when-clause against a raw health string.
pub fn compare_ceph_status(actual: &str, when: &str) -> Result<bool> {
    let actual = CephHealth::parse(actual)?;
    CephStatusEvaluator.evaluate(when, &actual)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CephCheckSummary {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CephHealthCheck {
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub summary: CephCheckSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CephHealthStatus {
    pub status: String,
    #[serde(default)]
    pub checks: BTreeMap<String, CephHealthCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsdMap {
    #[serde(default)]
    pub num_osds: u64,
    #[serde(default)]
    pub num_up_osds: u64,
    #[serde(default)]
    pub full: bool,
    #[serde(default)]
    pub nearfull: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsdMapWrapper {
    #[serde(default)]
    pub osdmap: OsdMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgMap {
    #[serde(default)]
    pub bytes_used: u64,
    #[serde(default)]
    pub bytes_total: u64,
}

/// The parts of `ceph status --format json` the analyzer reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CephStatus {
    pub health: CephHealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osdmap: Option<OsdMapWrapper>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pgmap: Option<PgMap>,
}

impl CephStatus {
    pub fn health(&self) -> Result<CephHealth> {
        CephHealth::parse(&self.health.status)
    }

    /// Extra lines appended to non-passing messages: OSD availability,
    /// storage pressure and the summaries of active health checks.
    pub fn details(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(OsdMapWrapper { osdmap }) = &self.osdmap {
            if osdmap.num_osds > 0 {
                lines.push(format!("{}/{} OSDs up", osdmap.num_up_osds, osdmap.num_osds));
            }
            if osdmap.full {
                lines.push("OSD disk is full".to_string());
            } else if osdmap.nearfull {
                lines.push("OSD disk is nearly full".to_string());
            }
        }
        if let Some(pgmap) = &self.pgmap
            && pgmap.bytes_total > 0
        {
            let usage = pgmap.bytes_used as f64 / pgmap.bytes_total as f64 * 100.0;
            lines.push(format!("PG storage usage is {:.1}%", usage));
        }
        for (name, check) in &self.health.checks {
            if !check.summary.message.is_empty() {
                lines.push(format!("{}: {}", name, check.summary.message));
            }
        }
        lines
    }
}
