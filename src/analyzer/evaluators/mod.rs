//! Conditional evaluators, one per kind of collected artifact.
//!
//! Each evaluator decodes nothing on its own: analyzers read and decode the
//! collected file, then hand the typed data to the evaluator together with the
//! outcome's when-clause. [`EvaluatorKind`] does the decode-and-evaluate step
//! by name, which is what `bundle-analyze eval` uses.

pub mod ceph;
pub mod cpu;
pub mod database;
pub mod disk_usage;
pub mod filesystem_performance;
pub mod host_os;
pub mod http;
pub mod memory;
pub mod node_resources;
pub mod registry;
pub mod sysctl;

pub use ceph::{CephHealth, CephStatus, CephStatusEvaluator, compare_ceph_status};
pub use cpu::{CpuEvaluator, CpuInfo};
pub use database::{DatabaseConnection, DatabaseEvaluator};
pub use disk_usage::{DiskUsageEvaluator, DiskUsageInfo};
pub use filesystem_performance::{FilesystemPerformanceEvaluator, FsPerfResults};
pub use host_os::{HostOsEvaluator, HostOsInfo};
pub use http::{HttpEvaluator, HttpResult};
pub use memory::{MemoryEvaluator, MemoryInfo};
pub use node_resources::{Node, NodeList, NodeResourceFilters, NodeResourcesEvaluator, filter_nodes};
pub use registry::{RegistryImagesEvaluator, RegistryInfo};
pub use sysctl::{SysctlEvaluator, SysctlParams};

use crate::analyzer::conditional::Evaluator;
use crate::error::{AnalyzeError, Result};
use serde::de::DeserializeOwned;
use std::fmt;

/// Decode a collected JSON artifact.
pub fn decode_json<T: DeserializeOwned>(what: &str, data: &[u8]) -> Result<T> {
    serde_json::from_slice(data).map_err(|e| AnalyzeError::decode(what, e))
}

/// Evaluators addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluatorKind {
    Cpu,
    Memory,
    DiskUsage,
    FilesystemPerformance,
    Sysctl,
    Http,
    RegistryImages,
    NodeResources,
    CephStatus,
    Database,
    HostOs,
}

impl EvaluatorKind {
    pub const ALL: [Self; 11] = [
        Self::Cpu,
        Self::Memory,
        Self::DiskUsage,
        Self::FilesystemPerformance,
        Self::Sysctl,
        Self::Http,
        Self::RegistryImages,
        Self::NodeResources,
        Self::CephStatus,
        Self::Database,
        Self::HostOs,
    ];

    /// Parse an evaluator name. Matching ignores case and `-`/`_`.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "cpu" => Some(Self::Cpu),
            "memory" => Some(Self::Memory),
            "diskusage" => Some(Self::DiskUsage),
            "filesystemperformance" => Some(Self::FilesystemPerformance),
            "sysctl" => Some(Self::Sysctl),
            "http" => Some(Self::Http),
            "registryimages" => Some(Self::RegistryImages),
            "noderesources" => Some(Self::NodeResources),
            "cephstatus" | "ceph" => Some(Self::CephStatus),
            "database" | "postgres" | "mysql" | "redis" => Some(Self::Database),
            "hostos" => Some(Self::HostOs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::DiskUsage => "diskUsage",
            Self::FilesystemPerformance => "filesystemPerformance",
            Self::Sysctl => "sysctl",
            Self::Http => "http",
            Self::RegistryImages => "registryImages",
            Self::NodeResources => "nodeResources",
            Self::CephStatus => "cephStatus",
            Self::Database => "database",
            Self::HostOs => "hostOS",
        }
    }

    /// Decode `data` as this evaluator's artifact and evaluate `when` against it.
    ///
    /// `nodeResources` takes a node list (`{"items": [...]}`) and `cephStatus`
    /// takes `ceph status` output; every other evaluator takes the artifact
    /// its analyzer reads.
    pub fn evaluate_json(&self, when: &str, data: &[u8]) -> Result<bool> {
        let what = self.as_str();
        match self {
            Self::Cpu => CpuEvaluator.evaluate(when, &decode_json::<CpuInfo>(what, data)?),
            Self::Memory => MemoryEvaluator.evaluate(when, &decode_json::<MemoryInfo>(what, data)?),
            Self::DiskUsage => DiskUsageEvaluator.evaluate(when, &decode_json::<DiskUsageInfo>(what, data)?),
            Self::FilesystemPerformance => {
                FilesystemPerformanceEvaluator.evaluate(when, &decode_json::<FsPerfResults>(what, data)?)
            }
            Self::Sysctl => SysctlEvaluator.evaluate(when, &decode_json::<SysctlParams>(what, data)?),
            Self::Http => HttpEvaluator.evaluate(when, &decode_json::<HttpResult>(what, data)?),
            Self::RegistryImages => {
                let info = decode_json::<RegistryInfo>(what, data)?;
                RegistryImagesEvaluator.evaluate(when, &info.counts())
            }
            Self::NodeResources => {
                let list = decode_json::<NodeList>(what, data)?;
                NodeResourcesEvaluator::default().evaluate(when, &list.items)
            }
            Self::CephStatus => {
                let status = decode_json::<CephStatus>(what, data)?;
                CephStatusEvaluator.evaluate(when, &status.health()?)
            }
            Self::Database => DatabaseEvaluator.evaluate(when, &decode_json::<DatabaseConnection>(what, data)?),
            Self::HostOs => HostOsEvaluator.evaluate(when, &decode_json::<HostOsInfo>(what, data)?),
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
