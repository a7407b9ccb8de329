//! Image availability in container registries.

use super::{Analyzer, require_outcomes};
use crate::analyzer::conditional::Evaluator;
use crate::analyzer::evaluators::{RegistryImagesEvaluator, RegistryInfo, decode_json};
use crate::analyzer::outcome::resolve;
use crate::analyzer::provider::FileProvider;
use crate::analyzer::types::{AnalyzeMeta, AnalyzeResult, Outcome};
use crate::error::{Result, ResultExt};
use log::debug;
use serde::{Deserialize, Serialize};

const REGISTRY_ICON_KEY: &str = "kubernetes_registry_analyze";
const REGISTRY_ICON_URI: &str = "https://troubleshoot.sh/images/analyzer-icons/registry-analyze.svg";

/// `analyzers[].registryImages`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryImagesAnalyzer {
    #[serde(flatten)]
    pub meta: AnalyzeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_name: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

impl RegistryImagesAnalyzer {
    fn collector_name(&self) -> &str {
        self.collector_name.as_deref().filter(|n| !n.is_empty()).unwrap_or("images")
    }

    pub fn path(&self) -> String {
        format!("registry/{}.json", self.collector_name())
    }
}

impl Analyzer for RegistryImagesAnalyzer {
    fn title(&self) -> String {
        self.meta.title_or(self.collector_name())
    }

    fn is_excluded(&self) -> Result<bool> {
        self.meta.is_excluded()
    }

    fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>> {
        let title = self.title();
        require_outcomes(&title, &self.outcomes)?;
        let path = self.path();
        let data = provider
            .get_collected_file_contents(&path)
            .with_context(|| format!("failed to read collected file name: {}", path))?;
        let info: RegistryInfo = decode_json("registry info", &data)?;
        let counts = info.counts();
        debug!(
            "{}: {} verified, {} missing, {} errors",
            title, counts.verified, counts.missing, counts.errors
        );

        let result = resolve(&self.outcomes, &title, |when| RegistryImagesEvaluator.evaluate(when, &counts))?
            .with_icon(REGISTRY_ICON_KEY, REGISTRY_ICON_URI)
            .with_strict(self.meta.is_strict()?);
        Ok(vec![result])
    }
}
