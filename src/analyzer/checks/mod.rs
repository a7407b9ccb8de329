//! Analyzers: read one kind of collected artifact from the bundle, decode it,
//! and resolve the configured outcomes against it with the matching evaluator.

pub mod ceph;
pub mod database;
pub mod host_probes;
pub mod host_system;
pub mod node_resources;
pub mod registry;

pub use ceph::CephStatusAnalyzer;
pub use database::{DatabaseAnalyzer, DatabaseDriver};
pub use host_probes::{HostDiskUsageAnalyzer, HostFilesystemPerformanceAnalyzer, HostHttpAnalyzer};
pub use host_system::{HostCpuAnalyzer, HostMemoryAnalyzer, HostOsAnalyzer, HostSysctlAnalyzer};
pub use node_resources::NodeResourcesAnalyzer;
pub use registry::RegistryImagesAnalyzer;

use crate::analyzer::conditional::Evaluator;
use crate::analyzer::evaluators::decode_json;
use crate::analyzer::outcome::{resolve, resolve_each};
use crate::analyzer::provider::FileProvider;
use crate::analyzer::types::{AnalyzeResult, ObjectReference, Outcome};
use crate::error::{AnalyzeError, Result, ResultExt};
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// One configured check.
pub trait Analyzer: Send + Sync {
    /// Title given to every result, unless overridden per node.
    fn title(&self) -> String;

    /// Whether the check is switched off by its `exclude` setting.
    fn is_excluded(&self) -> Result<bool>;

    /// Run the check. A missing artifact is reported as
    /// [`AnalyzeError::NotFound`].
    fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>>;
}

/// Directory holding host facts, both local and per remote node.
pub const NODE_INFO_BASE_DIR: &str = "host-collectors/system";

/// Names of the nodes remote host collectors ran on.
pub const NODE_LIST_PATH: &str = "host-collectors/system/node_list.json";

/// A host artifact, collected locally (`node_name == None`) or on a remote node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedContent {
    pub node_name: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct NodeNames {
    #[serde(default)]
    nodes: Vec<String>,
}

/// Read a host artifact. The local copy wins; without one, every node in the
/// node list must have its own copy under `<base_dir>/<node>/<file_name>`.
/// Bundles without a node list are searched for per-node copies instead.
pub fn retrieve_collected_contents(
    provider: &dyn FileProvider,
    local_path: &str,
    base_dir: &str,
    file_name: &str,
) -> Result<Vec<CollectedContent>> {
    match provider.get_collected_file_contents(local_path) {
        Ok(data) => return Ok(vec![CollectedContent { node_name: None, data }]),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    debug!("{} not collected locally, looking for remote nodes", local_path);
    let list = match provider.get_collected_file_contents(NODE_LIST_PATH) {
        Ok(list) => list,
        Err(e) if e.is_not_found() => return discover_node_contents(provider, local_path, base_dir, file_name),
        Err(e) => return Err(e.wrap("failed to get node list")),
    };
    let names: NodeNames = decode_json("node list", &list)?;

    names
        .nodes
        .into_iter()
        .map(|node| {
            let path = format!("{}/{}/{}", base_dir, node, file_name);
            let data = provider
                .get_collected_file_contents(&path)
                .with_context(|| format!("failed to retrieve content for node {}", node))?;
            Ok(CollectedContent {
                node_name: Some(node),
                data,
            })
        })
        .collect()
}

/// Per-node copies found by matching `<base_dir>/*/<file_name>`, ordered by
/// node name.
fn discover_node_contents(
    provider: &dyn FileProvider,
    local_path: &str,
    base_dir: &str,
    file_name: &str,
) -> Result<Vec<CollectedContent>> {
    let pattern = format!(
        "{}/*/{}",
        glob::Pattern::escape(base_dir),
        glob::Pattern::escape(file_name)
    );
    let found = provider.find_files(&pattern, &[])?;
    if found.is_empty() {
        return Err(AnalyzeError::NotFound(local_path.to_string()));
    }
    debug!("Found {} per-node copies of {}", found.len(), file_name);

    let prefix = format!("{}/", base_dir);
    Ok(found
        .into_iter()
        .filter_map(|(path, data)| {
            let node = path.strip_prefix(&prefix)?.split('/').next()?.to_string();
            Some(CollectedContent {
                node_name: Some(node),
                data,
            })
        })
        .collect())
}

/// Title for a result about one remote node.
pub fn node_title(title: &str, node: &str) -> String {
    format!("{} - Node {}", title, node)
}

/// Decode each collected copy with `decode` and resolve `outcomes` against it.
///
/// A local artifact produces exactly one result (inconclusive when nothing
/// matched). Remote artifacts produce one result per node that matched an
/// outcome, titled with the node name and pointing at the node.
pub fn analyze_host_contents<E, D>(
    contents: &[CollectedContent],
    outcomes: &[Outcome],
    title: &str,
    evaluator: &E,
    decode: D,
) -> Result<Vec<AnalyzeResult>>
where
    E: Evaluator,
    E::Data: Sized,
    D: Fn(&[u8]) -> Result<E::Data>,
{
    let decoded = contents
        .iter()
        .map(|c| Ok((c.node_name.clone(), decode(&c.data)?)))
        .collect::<Result<Vec<(Option<String>, E::Data)>>>()?;

    if let [(None, data)] = decoded.as_slice() {
        let result = resolve(outcomes, title, |when| evaluator.evaluate(when, data))
            .context("failed to evaluate outcomes")?;
        return Ok(vec![result]);
    }

    let resolved = resolve_each(
        outcomes,
        decoded.iter(),
        |(node, _)| match node {
            Some(node) => node_title(title, node),
            None => title.to_string(),
        },
        |when, (_, data)| evaluator.evaluate(when, data),
    )?;

    Ok(resolved
        .into_iter()
        .map(|((node, _), result)| match node {
            Some(node) => result.with_involved_object(ObjectReference::node(node.as_str())),
            None => result,
        })
        .collect())
}

/// Decode a JSON artifact as `T`, naming it `what` in errors.
pub fn json_decoder<T: DeserializeOwned>(what: &'static str) -> impl Fn(&[u8]) -> Result<T> {
    move |data| decode_json(what, data)
}

/// Fail early on an analyzer configured without outcomes.
pub fn require_outcomes(title: &str, outcomes: &[Outcome]) -> Result<()> {
    if outcomes.is_empty() {
        return Err(AnalyzeError::Spec(format!("{} has no outcomes", title)));
    }
    Ok(())
}
