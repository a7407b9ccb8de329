//! Host probes stored per collector name: disk usage, filesystem write latency
//! and HTTP requests.

use super::{Analyzer, require_outcomes};
use crate::analyzer::conditional::Evaluator;
use crate::analyzer::evaluators::{
    DiskUsageEvaluator, DiskUsageInfo, FilesystemPerformanceEvaluator, FsPerfResults, HttpEvaluator, HttpResult,
    decode_json,
};
use crate::analyzer::outcome::resolve;
use crate::analyzer::provider::FileProvider;
use crate::analyzer::types::{AnalyzeMeta, AnalyzeResult, Outcome};
use crate::error::{Result, ResultExt};
use serde::{Deserialize, Serialize};

fn collector_path(dir: &str, collector_name: Option<&str>, default_name: &str) -> String {
    let name = collector_name.filter(|n| !n.is_empty()).unwrap_or(default_name);
    format!("host-collectors/{}/{}.json", dir, name)
}

fn read_probe(provider: &dyn FileProvider, path: &str) -> Result<Vec<u8>> {
    provider
        .get_collected_file_contents(path)
        .with_context(|| format!("failed to get collected file {}", path))
}

/// `hostAnalyzers[].diskUsage`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDiskUsageAnalyzer {
    #[serde(flatten)]
    pub meta: AnalyzeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_name: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

impl HostDiskUsageAnalyzer {
    pub fn path(&self) -> String {
        collector_path("diskUsage", self.collector_name.as_deref(), "diskUsage")
    }
}

impl Analyzer for HostDiskUsageAnalyzer {
    fn title(&self) -> String {
        let default = format!("Disk Usage {}", self.collector_name.as_deref().unwrap_or_default());
        self.meta.title_or(default.trim_end())
    }

    fn is_excluded(&self) -> Result<bool> {
        self.meta.is_excluded()
    }

    fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>> {
        let title = self.title();
        require_outcomes(&title, &self.outcomes)?;
        let path = self.path();
        let usage: DiskUsageInfo = decode_json("disk usage info", &read_probe(provider, &path)?)?;
        let result = resolve(&self.outcomes, &title, |when| DiskUsageEvaluator.evaluate(when, &usage))?;
        Ok(vec![result.with_strict(self.meta.is_strict()?)])
    }
}

/// `hostAnalyzers[].filesystemPerformance`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostFilesystemPerformanceAnalyzer {
    #[serde(flatten)]
    pub meta: AnalyzeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_name: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

impl HostFilesystemPerformanceAnalyzer {
    pub fn path(&self) -> String {
        collector_path(
            "filesystemPerformance",
            self.collector_name.as_deref(),
            "filesystemPerformance",
        )
    }
}

impl Analyzer for HostFilesystemPerformanceAnalyzer {
    fn title(&self) -> String {
        self.meta.title_or("Filesystem Performance")
    }

    fn is_excluded(&self) -> Result<bool> {
        self.meta.is_excluded()
    }

    fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>> {
        let title = self.title();
        require_outcomes(&title, &self.outcomes)?;
        let path = self.path();
        let perf: FsPerfResults = decode_json("filesystem performance results", &read_probe(provider, &path)?)?;
        let mut result = resolve(&self.outcomes, &title, |when| {
            FilesystemPerformanceEvaluator.evaluate(when, &perf)
        })?;
        result.message = perf.render_message(&result.message);
        Ok(vec![result.with_strict(self.meta.is_strict()?)])
    }
}

/// `hostAnalyzers[].http`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostHttpAnalyzer {
    #[serde(flatten)]
    pub meta: AnalyzeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_name: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

impl HostHttpAnalyzer {
    pub fn path(&self) -> String {
        collector_path("http", self.collector_name.as_deref(), "result")
    }
}

impl Analyzer for HostHttpAnalyzer {
    fn title(&self) -> String {
        self.meta.title_or("HTTP Request")
    }

    fn is_excluded(&self) -> Result<bool> {
        self.meta.is_excluded()
    }

    fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>> {
        let title = self.title();
        require_outcomes(&title, &self.outcomes)?;
        let path = self.path();
        let probe: HttpResult = decode_json("http result", &read_probe(provider, &path)?)?;
        let result = resolve(&self.outcomes, &title, |when| HttpEvaluator.evaluate(when, &probe))?;
        Ok(vec![result.with_strict(self.meta.is_strict()?)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::provider::MemoryBundle;
    use crate::analyzer::types::OutcomeKind;
    use crate::error::ErrorKind;

    #[test]
    fn test_disk_usage() {
        let bundle = MemoryBundle::new().with_file(
            "host-collectors/diskUsage/etcd.json",
            r#"{"total_bytes": 100000000000, "used_bytes": 85000000000}"#,
        );
        let analyzer = HostDiskUsageAnalyzer {
            collector_name: Some("etcd".to_string()),
            outcomes: vec![
                Outcome::fail("used/total > 90%", "Disk is almost full"),
                Outcome::warn("used/total > 80%", "Disk is filling up"),
                Outcome::pass("", "Disk usage is fine"),
            ],
            ..HostDiskUsageAnalyzer::default()
        };
        assert_eq!(analyzer.title(), "Disk Usage etcd");
        let results = analyzer.analyze(&bundle).unwrap();
        assert_eq!(results[0].verdict(), Some(OutcomeKind::Warn));
    }

    #[test]
    fn test_default_paths() {
        assert_eq!(
            HostDiskUsageAnalyzer::default().path(),
            "host-collectors/diskUsage/diskUsage.json"
        );
        assert_eq!(HostDiskUsageAnalyzer::default().title(), "Disk Usage");
        assert_eq!(HostHttpAnalyzer::default().path(), "host-collectors/http/result.json");
        assert_eq!(
            HostFilesystemPerformanceAnalyzer::default().path(),
            "host-collectors/filesystemPerformance/filesystemPerformance.json"
        );
    }

    #[test]
    fn test_filesystem_performance_message() {
        let bundle = MemoryBundle::new().with_file(
            "host-collectors/filesystemPerformance/etcd.json",
            r#"{"P99": 12000000, "Average": 2000000}"#,
        );
        let analyzer = HostFilesystemPerformanceAnalyzer {
            collector_name: Some("etcd".to_string()),
            outcomes: vec![
                Outcome::fail("p99 > 10ms", "Write latency is high: {{ .P99 }} at p99"),
                Outcome::pass("", "Write latency is ok"),
            ],
            ..HostFilesystemPerformanceAnalyzer::default()
        };
        let results = analyzer.analyze(&bundle).unwrap();
        assert!(results[0].is_fail);
        assert_eq!(results[0].message, "Write latency is high: 12ms at p99");
    }

    #[test]
    fn test_http() {
        let bundle = MemoryBundle::new()
            .with_file("host-collectors/http/result.json", r#"{"error": {"message": "connection refused"}}"#);
        let analyzer = HostHttpAnalyzer {
            outcomes: vec![
                Outcome::fail("error", "Cannot reach the registry"),
                Outcome::pass("statusCode == 200", "Registry is reachable"),
            ],
            ..HostHttpAnalyzer::default()
        };
        let results = analyzer.analyze(&bundle).unwrap();
        assert_eq!(results[0].message, "Cannot reach the registry");
    }

    #[test]
    fn test_missing_probe() {
        let analyzer = HostHttpAnalyzer {
            outcomes: vec![Outcome::pass("", "ok")],
            ..HostHttpAnalyzer::default()
        };
        let err = analyzer.analyze(&MemoryBundle::new()).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("host-collectors/http/result.json"));
    }

    #[test]
    fn test_bad_json() {
        let bundle = MemoryBundle::new().with_file("host-collectors/diskUsage/diskUsage.json", "{");
        let analyzer = HostDiskUsageAnalyzer {
            outcomes: vec![Outcome::pass("", "ok")],
            ..HostDiskUsageAnalyzer::default()
        };
        assert_eq!(analyzer.analyze(&bundle).unwrap_err().kind(), ErrorKind::Decode);
    }
}
