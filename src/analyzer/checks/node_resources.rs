//! Cluster capacity checks over `cluster-resources/nodes.json`.

use super::{Analyzer, require_outcomes};
use crate::analyzer::conditional::Evaluator;
use crate::analyzer::evaluators::{NodeList, NodeResourceFilters, NodeResourcesEvaluator, decode_json, filter_nodes};
use crate::analyzer::outcome::resolve;
use crate::analyzer::provider::FileProvider;
use crate::analyzer::types::{AnalyzeMeta, AnalyzeResult, Outcome};
use crate::error::{Result, ResultExt};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const NODES_PATH: &str = "cluster-resources/nodes.json";

const NODE_RESOURCES_ICON_KEY: &str = "kubernetes_node_resources";
const NODE_RESOURCES_ICON_URI: &str = "https://troubleshoot.sh/images/analyzer-icons/node-resources.svg?w=16&h=18";

static NODE_COUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{\s*\.NodeCount\s*\}\}").unwrap());

/// `analyzers[].nodeResources`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResourcesAnalyzer {
    #[serde(flatten)]
    pub meta: AnalyzeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<NodeResourceFilters>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

impl Analyzer for NodeResourcesAnalyzer {
    fn title(&self) -> String {
        self.meta.title_or("Node Resources")
    }

    fn is_excluded(&self) -> Result<bool> {
        self.meta.is_excluded()
    }

    fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>> {
        let title = self.title();
        require_outcomes(&title, &self.outcomes)?;
        let data = provider
            .get_collected_file_contents(NODES_PATH)
            .context("failed to get contents of nodes.json")?;
        let list: NodeList = decode_json("node list", &data)?;

        let nodes = filter_nodes(&list.items, self.filters.as_ref())?;
        debug!("{}: {} of {} node(s) match filters", title, nodes.len(), list.items.len());

        let evaluator = NodeResourcesEvaluator::new(self.filters.as_ref().and_then(|f| f.resource_name.clone()));
        let mut result = resolve(&self.outcomes, &title, |when| evaluator.evaluate(when, &nodes))?
            .with_icon(NODE_RESOURCES_ICON_KEY, NODE_RESOURCES_ICON_URI)
            .with_strict(self.meta.is_strict()?);
        result.message = NODE_COUNT_REGEX
            .replace_all(&result.message, nodes.len().to_string().as_str())
            .into_owned();
        Ok(vec![result])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::provider::MemoryBundle;
    use crate::analyzer::types::BoolOrString;
    use crate::error::ErrorKind;

    const NODES: &str = r#"{"items": [
        {"metadata": {"name": "a", "labels": {"role": "worker"}},
         "status": {"capacity": {"cpu": "4", "memory": "16Gi", "pods": "110"},
                    "allocatable": {"cpu": "3800m", "memory": "15Gi", "pods": "110"},
                    "conditions": [{"type": "Ready", "status": "True"}]}},
        {"metadata": {"name": "b", "labels": {"role": "worker"}},
         "status": {"capacity": {"cpu": "8", "memory": "32Gi", "pods": "110"},
                    "allocatable": {"cpu": "7800m", "memory": "31Gi", "pods": "110"},
                    "conditions": [{"type": "Ready", "status": "True"}]}},
        {"metadata": {"name": "c", "labels": {"role": "control-plane"}},
         "status": {"capacity": {"cpu": "2", "memory": "4Gi", "pods": "110"},
                    "allocatable": {"cpu": "1800m", "memory": "3Gi", "pods": "110"},
                    "conditions": [{"type": "Ready", "status": "False"}]}}
    ]}"#;

    fn bundle() -> MemoryBundle {
        MemoryBundle::new().with_file(NODES_PATH, NODES)
    }

    #[test]
    fn test_count() {
        let analyzer = NodeResourcesAnalyzer {
            outcomes: vec![
                Outcome::fail("count() < 3", "Need at least 3 nodes, found {{ .NodeCount }}"),
                Outcome::pass("", "Found {{ .NodeCount }} nodes"),
            ],
            ..NodeResourcesAnalyzer::default()
        };
        let results = analyzer.analyze(&bundle()).unwrap();
        assert!(results[0].is_pass);
        assert_eq!(results[0].message, "Found 3 nodes");
        assert_eq!(results[0].icon_key, NODE_RESOURCES_ICON_KEY);
    }

    #[test]
    fn test_filters_and_strict() {
        let yaml = r#"
checkName: Worker memory
strict: "true"
filters:
  selector:
    matchLabel:
      role: worker
outcomes:
  - fail:
      when: "min(memoryCapacity) < 16Gi"
      message: Workers need 16Gi
  - pass:
      when: "sum(cpuCapacity) >= 12"
      message: Enough CPU across {{ .NodeCount }} workers
"#;
        let analyzer: NodeResourcesAnalyzer = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(analyzer.meta.strict, Some(BoolOrString::String("true".to_string())));
        let results = analyzer.analyze(&bundle()).unwrap();
        assert_eq!(results[0].title, "Worker memory");
        assert!(results[0].is_pass);
        assert!(results[0].strict);
        assert_eq!(results[0].message, "Enough CPU across 2 workers");
    }

    #[test]
    fn test_node_condition() {
        let analyzer = NodeResourcesAnalyzer {
            outcomes: vec![
                Outcome::warn("nodeCondition(Ready) == False", "A node is not ready"),
                Outcome::pass("", "All nodes ready"),
            ],
            ..NodeResourcesAnalyzer::default()
        };
        assert!(analyzer.analyze(&bundle()).unwrap()[0].is_warn);
    }

    #[test]
    fn test_missing_nodes_file() {
        let analyzer = NodeResourcesAnalyzer {
            outcomes: vec![Outcome::pass("", "ok")],
            ..NodeResourcesAnalyzer::default()
        };
        assert_eq!(analyzer.analyze(&MemoryBundle::new()).unwrap_err().kind(), ErrorKind::NotFound);
    }
}
