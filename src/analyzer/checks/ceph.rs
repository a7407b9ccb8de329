//! Ceph cluster health, read from `ceph status` output collected by Rook.

use super::Analyzer;
use crate::analyzer::conditional::Evaluator;
use crate::analyzer::evaluators::ceph::default_outcomes;
use crate::analyzer::evaluators::{CephStatus, CephStatusEvaluator, decode_json};
use crate::analyzer::outcome::resolve;
use crate::analyzer::provider::FileProvider;
use crate::analyzer::types::{AnalyzeMeta, AnalyzeResult, Outcome};
use crate::error::{Result, ResultExt};
use serde::{Deserialize, Serialize};

/// Namespace Rook installs Ceph into unless told otherwise.
pub const DEFAULT_CEPH_NAMESPACE: &str = "rook-ceph";

pub const CEPH_ICON_KEY: &str = "rook";
pub const CEPH_ICON_URI: &str = "https://troubleshoot.sh/images/analyzer-icons/rook.svg?w=11&h=16";

/// `analyzers[].cephStatus`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CephStatusAnalyzer {
    #[serde(flatten)]
    pub meta: AnalyzeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Falls back to the standard HEALTH_OK / HEALTH_WARN / HEALTH_ERR outcomes.
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

impl CephStatusAnalyzer {
    /// `[<collectorName>/][<namespace>/]ceph/status.json`; the default
    /// namespace is not part of the path.
    pub fn path(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(name) = self.collector_name.as_deref().filter(|n| !n.is_empty()) {
            parts.push(name);
        }
        if let Some(ns) = self
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty() && *ns != DEFAULT_CEPH_NAMESPACE)
        {
            parts.push(ns);
        }
        parts.push("ceph");
        parts.push("status.json");
        parts.join("/")
    }
}

impl Analyzer for CephStatusAnalyzer {
    fn title(&self) -> String {
        self.meta.title_or("Ceph Status")
    }

    fn is_excluded(&self) -> Result<bool> {
        self.meta.is_excluded()
    }

    fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>> {
        let path = self.path();
        let data = provider
            .get_collected_file_contents(&path)
            .with_context(|| format!("failed to get contents of {}", path))?;
        let status: CephStatus = decode_json("ceph status", &data)?;
        let health = status.health()?;

        let defaults;
        let outcomes = if self.outcomes.is_empty() {
            defaults = default_outcomes();
            &defaults
        } else {
            &self.outcomes
        };

        let mut result = resolve(outcomes, &self.title(), |when| CephStatusEvaluator.evaluate(when, &health))?
            .with_icon(CEPH_ICON_KEY, CEPH_ICON_URI)
            .with_strict(self.meta.is_strict()?);

        if result.is_warn || result.is_fail {
            for line in status.details() {
                result.message.push('\n');
                result.message.push_str(&line);
            }
        }
        Ok(vec![result])
    }
}
