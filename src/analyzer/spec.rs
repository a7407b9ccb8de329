//! Loading analyzer specs from YAML.
//!
//! A spec file holds one or more documents. Documents of kind `Analyzer`,
//! `SupportBundle`, `Preflight` or `HostPreflight` contribute the entries of
//! `spec.analyzers` and `spec.hostAnalyzers`; other kinds are ignored. Each
//! entry is a mapping with a single key naming the analyzer:
//!
//! ```yaml
//! apiVersion: troubleshoot.sh/v1beta2
//! kind: HostPreflight
//! spec:
//!   hostAnalyzers:
//!     - cpu:
//!         outcomes:
//!           - fail:
//!               when: "count < 2"
//!               message: At least 2 CPU cores are required
//! ```

use crate::analyzer::checks::{
    Analyzer, CephStatusAnalyzer, DatabaseAnalyzer, DatabaseDriver, HostCpuAnalyzer, HostDiskUsageAnalyzer,
    HostFilesystemPerformanceAnalyzer, HostHttpAnalyzer, HostMemoryAnalyzer, HostOsAnalyzer, HostSysctlAnalyzer,
    NodeResourcesAnalyzer, RegistryImagesAnalyzer,
};
use crate::error::{AnalyzeError, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;

/// Document kinds that carry analyzers.
pub const ANALYZER_KINDS: &[&str] = &["Analyzer", "SupportBundle", "Preflight", "HostPreflight"];

/// Analyzer keys this crate implements.
pub const SUPPORTED_ANALYZERS: &[&str] = &[
    "cpu",
    "memory",
    "sysctl",
    "hostOS",
    "diskUsage",
    "filesystemPerformance",
    "http",
    "cephStatus",
    "registryImages",
    "nodeResources",
    "postgres",
    "mysql",
    "redis",
];

/// Every analyzer declared across the documents of a spec, in order.
#[derive(Default)]
pub struct AnalyzerSpec {
    pub analyzers: Vec<Box<dyn Analyzer>>,
    /// Keys of entries that were skipped because they aren't implemented.
    pub skipped: Vec<String>,
}

impl AnalyzerSpec {
    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    fn merge(&mut self, other: AnalyzerSpec) {
        self.analyzers.extend(other.analyzers);
        self.skipped.extend(other.skipped);
    }
}

impl fmt::Debug for AnalyzerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let titles: Vec<String> = self.analyzers.iter().map(|a| a.title()).collect();
        f.debug_struct("AnalyzerSpec")
            .field("analyzers", &titles)
            .field("skipped", &self.skipped)
            .finish()
    }
}

/// Load a spec file.
pub fn load_spec(path: &Path) -> Result<AnalyzerSpec> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AnalyzeError::Spec(format!("failed to read {}: {}", path.display(), e)))?;
    parse_spec_with_path(&content, path)
}

/// Parse spec YAML that didn't come from a file.
pub fn parse_spec(content: &str) -> Result<AnalyzerSpec> {
    parse_spec_with_path(content, Path::new("<stdin>"))
}

/// Parse spec YAML, naming `path` and the document's line in errors.
pub fn parse_spec_with_path(content: &str, path: &Path) -> Result<AnalyzerSpec> {
    let mut spec = AnalyzerSpec::default();
    let mut line_number = 1usize;

    for doc in content.split("\n---") {
        let doc_lines = doc.lines().count() + 1;
        let trimmed = doc.trim();
        if trimmed.is_empty() || trimmed.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            line_number += doc_lines;
            continue;
        }

        let value: serde_yaml::Value = serde_yaml::from_str(trimmed).map_err(|e| {
            AnalyzeError::Spec(format!("{} (document at line {}): {}", path.display(), line_number, e))
        })?;
        let parsed = parse_document(&value)
            .map_err(|e| e.wrap(format!("{} (document at line {})", path.display(), line_number)))?;
        spec.merge(parsed);
        line_number += doc_lines;
    }

    debug!("Loaded {} analyzer(s) from {}", spec.len(), path.display());
    Ok(spec)
}

fn parse_document(value: &serde_yaml::Value) -> Result<AnalyzerSpec> {
    let mut spec = AnalyzerSpec::default();
    let kind = value.get("kind").and_then(|k| k.as_str()).unwrap_or_default();
    if !ANALYZER_KINDS.contains(&kind) {
        debug!("Ignoring document of kind {:?}", kind);
        return Ok(spec);
    }

    let Some(body) = value.get("spec") else {
        return Ok(spec);
    };
    for list in ["analyzers", "hostAnalyzers"] {
        let Some(entries) = body.get(list) else {
            continue;
        };
        let entries = entries
            .as_sequence()
            .ok_or_else(|| AnalyzeError::Spec(format!("spec.{} must be a list", list)))?;
        for (index, entry) in entries.iter().enumerate() {
            let (key, analyzer) = parse_entry(entry).map_err(|e| e.wrap(format!("spec.{}[{}]", list, index)))?;
            match analyzer {
                Some(analyzer) => spec.analyzers.push(analyzer),
                None => {
                    warn!("Skipping unsupported analyzer {:?} (spec.{}[{}])", key, list, index);
                    spec.skipped.push(key);
                }
            }
        }
    }
    Ok(spec)
}

/// Build the analyzer of a single-key entry. Unknown keys yield `None`.
fn parse_entry(entry: &serde_yaml::Value) -> Result<(String, Option<Box<dyn Analyzer>>)> {
    let mapping = entry
        .as_mapping()
        .ok_or_else(|| AnalyzeError::Spec("analyzer entry must be a mapping".to_string()))?;
    if mapping.len() != 1 {
        return Err(AnalyzeError::Spec(format!(
            "analyzer entry must set exactly one analyzer, found {}",
            mapping.len()
        )));
    }
    let Some((key, body)) = mapping.iter().next() else {
        return Err(AnalyzeError::Spec("empty analyzer entry".to_string()));
    };
    let key = key
        .as_str()
        .ok_or_else(|| AnalyzeError::Spec("analyzer key must be a string".to_string()))?
        .to_string();
    let analyzer = build_analyzer(&key, body)?;
    Ok((key, analyzer))
}

fn build_analyzer(key: &str, body: &serde_yaml::Value) -> Result<Option<Box<dyn Analyzer>>> {
    let analyzer: Box<dyn Analyzer> = match key {
        "cpu" => Box::new(decode::<HostCpuAnalyzer>(key, body)?),
        "memory" => Box::new(decode::<HostMemoryAnalyzer>(key, body)?),
        "sysctl" => Box::new(decode::<HostSysctlAnalyzer>(key, body)?),
        "hostOS" => Box::new(decode::<HostOsAnalyzer>(key, body)?),
        "diskUsage" => Box::new(decode::<HostDiskUsageAnalyzer>(key, body)?),
        "filesystemPerformance" => Box::new(decode::<HostFilesystemPerformanceAnalyzer>(key, body)?),
        "http" => Box::new(decode::<HostHttpAnalyzer>(key, body)?),
        "cephStatus" => Box::new(decode::<CephStatusAnalyzer>(key, body)?),
        "registryImages" => Box::new(decode::<RegistryImagesAnalyzer>(key, body)?),
        "nodeResources" => Box::new(decode::<NodeResourcesAnalyzer>(key, body)?),
        "postgres" | "mysql" | "redis" => {
            let driver = DatabaseDriver::parse(key).unwrap_or_default();
            Box::new(decode::<DatabaseAnalyzer>(key, body)?.with_driver(driver))
        }
        _ => return Ok(None),
    };
    Ok(Some(analyzer))
}

fn decode<T: DeserializeOwned + Default>(key: &str, body: &serde_yaml::Value) -> Result<T> {
    // `- cpu: {}` and `- cpu:` are both allowed
    if body.is_null() {
        return Ok(T::default());
    }
    serde_yaml::from_value(body.clone()).map_err(|e| AnalyzeError::Spec(format!("invalid {} analyzer: {}", key, e)))
}
