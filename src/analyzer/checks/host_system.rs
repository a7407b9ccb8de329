//! Host facts collected under `host-collectors/system/`: CPU, memory, kernel
//! parameters and OS details. Each can come from the local host or from a
//! set of remote nodes.

use super::{
    Analyzer, NODE_INFO_BASE_DIR, analyze_host_contents, json_decoder, require_outcomes,
    retrieve_collected_contents,
};
use crate::analyzer::conditional::Evaluator;
use crate::analyzer::evaluators::{CpuEvaluator, HostOsEvaluator, MemoryEvaluator, SysctlEvaluator};
use crate::analyzer::provider::FileProvider;
use crate::analyzer::types::{AnalyzeMeta, AnalyzeResult, Outcome};
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Run a system-fact check: fetch local or per-node copies of `file_name`,
/// decode them and resolve the outcomes.
fn analyze_system_file<E>(
    provider: &dyn FileProvider,
    meta: &AnalyzeMeta,
    outcomes: &[Outcome],
    title: &str,
    file_name: &str,
    evaluator: &E,
    what: &'static str,
) -> Result<Vec<AnalyzeResult>>
where
    E: Evaluator,
    E::Data: Sized + DeserializeOwned,
{
    require_outcomes(title, outcomes)?;
    let local_path = format!("{}/{}", NODE_INFO_BASE_DIR, file_name);
    let contents = retrieve_collected_contents(provider, &local_path, NODE_INFO_BASE_DIR, file_name)?;
    let strict = meta.is_strict()?;
    let results = analyze_host_contents(&contents, outcomes, title, evaluator, json_decoder::<E::Data>(what))?;
    Ok(results.into_iter().map(|r| r.with_strict(strict)).collect())
}

macro_rules! system_analyzer {
    ($(#[$doc:meta])* $name:ident, $default_title:expr, $file:expr, $evaluator:expr, $what:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(flatten)]
            pub meta: AnalyzeMeta,
            #[serde(default)]
            pub outcomes: Vec<Outcome>,
        }

        impl $name {
            pub const FILE_NAME: &'static str = $file;

            pub fn new(outcomes: Vec<Outcome>) -> Self {
                Self {
                    meta: AnalyzeMeta::default(),
                    outcomes,
                }
            }
        }

        impl Analyzer for $name {
            fn title(&self) -> String {
                self.meta.title_or($default_title)
            }

            fn is_excluded(&self) -> Result<bool> {
                self.meta.is_excluded()
            }

            fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>> {
                analyze_system_file(
                    provider,
                    &self.meta,
                    &self.outcomes,
                    &self.title(),
                    Self::FILE_NAME,
                    &$evaluator,
                    $what,
                )
            }
        }
    };
}

system_analyzer!(
    /// `hostAnalyzers[].cpu`
    HostCpuAnalyzer,
    "Number of CPUs",
    "cpu.json",
    CpuEvaluator,
    "cpu info"
);

system_analyzer!(
    /// `hostAnalyzers[].memory`
    HostMemoryAnalyzer,
    "Amount of Memory",
    "memory.json",
    MemoryEvaluator,
    "memory info"
);

system_analyzer!(
    /// `hostAnalyzers[].sysctl`
    HostSysctlAnalyzer,
    "Sysctl",
    "sysctl.json",
    SysctlEvaluator,
    "sysctl parameters"
);

system_analyzer!(
    /// `hostAnalyzers[].hostOS`
    HostOsAnalyzer,
    "Host OS Info",
    "hostos_info.json",
    HostOsEvaluator,
    "host os info"
);
