//! Cluster node resource conditionals.
//!
//! The operand is a function over the set of nodes that passed the
//! analyzer's filters:
//! - `count()` (the default): number of nodes, `count() >= 3` or `< 3`
//! - `min(prop)`, `max(prop)`, `sum(prop)`: aggregate a node quantity,
//!   `min(memoryCapacity) >= 8Gi`
//! - `nodeCondition(Type)`: whether any node reports the condition with the
//!   given status, `nodeCondition(Ready) == True` (equality only)
//!
//! Operands are case-sensitive. `min` and `max` over an empty node set have
//! no value, so they never match.

use crate::analyzer::conditional::{ClauseSyntax, ComparisonOperator, Conditional, Evaluator};
use crate::analyzer::values::Quantity;
use crate::error::{AnalyzeError, Result, ResultExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static FUNCTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+)\(([^()]*)\)$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSystemInfo {
    #[serde(default)]
    pub architecture: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    #[serde(default)]
    pub capacity: BTreeMap<String, Quantity>,
    #[serde(default)]
    pub allocatable: BTreeMap<String, Quantity>,
    #[serde(default)]
    pub conditions: Vec<NodeCondition>,
    #[serde(default)]
    pub node_info: NodeSystemInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    #[serde(default)]
    pub value: String,
    pub effect: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default)]
    pub taints: Vec<Taint>,
}

/// A Kubernetes node, reduced to the fields the analyzer reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub metadata: NodeMetadata,
    #[serde(default)]
    pub spec: NodeSpec,
    #[serde(default)]
    pub status: NodeStatus,
}

/// `cluster-resources/nodes.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeList {
    #[serde(default)]
    pub items: Vec<Node>,
}

impl Node {
    /// Look up a quantity property. `resource_name` selects the resource for
    /// `resourceCapacity` and `resourceAllocatable`. Returns `Ok(None)` when
    /// the node doesn't report the resource.
    pub fn quantity(&self, property: &str, resource_name: Option<&str>) -> Result<Option<Quantity>> {
        let (map, key) = match property {
            "cpuCapacity" => (&self.status.capacity, "cpu"),
            "cpuAllocatable" => (&self.status.allocatable, "cpu"),
            "memoryCapacity" => (&self.status.capacity, "memory"),
            "memoryAllocatable" => (&self.status.allocatable, "memory"),
            "podCapacity" => (&self.status.capacity, "pods"),
            "podAllocatable" => (&self.status.allocatable, "pods"),
            "ephemeralStorageCapacity" => (&self.status.capacity, "ephemeral-storage"),
            "ephemeralStorageAllocatable" => (&self.status.allocatable, "ephemeral-storage"),
            "resourceCapacity" | "resourceAllocatable" => {
                let name = resource_name.filter(|n| !n.is_empty()).ok_or_else(|| {
                    AnalyzeError::Spec(format!("{} requires filters.resourceName", property))
                })?;
                let map = if property == "resourceCapacity" {
                    &self.status.capacity
                } else {
                    &self.status.allocatable
                };
                return Ok(map.get(name).copied());
            }
            other => return Err(AnalyzeError::unknown_operand("nodeResources", format!("property {}", other))),
        };
        Ok(map.get(key).copied())
    }

    fn has_condition(&self, condition_type: &str, status: &str) -> bool {
        self.status
            .conditions
            .iter()
            .any(|c| c.condition_type == condition_type && c.status == status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelector {
    #[serde(default)]
    pub match_label: BTreeMap<String, String>,
}

/// Restrict the nodes an analyzer looks at. Every configured filter must
/// pass; quantity filters are minimums.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResourceFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_capacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_allocatable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_capacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_allocatable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_capacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_allocatable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_capacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_allocatable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_storage_capacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_storage_allocatable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<NodeSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taint: Option<Taint>,
}

impl NodeResourceFilters {
    pub fn matches(&self, node: &Node) -> Result<bool> {
        if let Some(name) = self.resource_name.as_deref().filter(|n| !n.is_empty()) {
            let capacity = node.status.capacity.get(name);
            let allocatable = node.status.allocatable.get(name);
            if capacity.is_none() && allocatable.is_none() {
                return Ok(false);
            }
            if !at_least(capacity.copied(), self.resource_capacity.as_deref(), "resourceCapacity")?
                || !at_least(allocatable.copied(), self.resource_allocatable.as_deref(), "resourceAllocatable")?
            {
                return Ok(false);
            }
        }

        if let Some(selector) = &self.selector {
            let labels = &node.metadata.labels;
            if !selector.match_label.iter().all(|(k, v)| labels.get(k) == Some(v)) {
                return Ok(false);
            }
        }

        if let Some(taint) = &self.taint {
            let tainted = node.spec.taints.iter().any(|t| {
                t.key == taint.key && t.effect == taint.effect && (taint.value.is_empty() || t.value == taint.value)
            });
            if !tainted {
                return Ok(false);
            }
        }

        if let Some(arch) = self.cpu_architecture.as_deref().filter(|a| !a.is_empty())
            && !node.status.node_info.architecture.eq_ignore_ascii_case(arch)
        {
            return Ok(false);
        }

        let minimums = [
            ("cpuCapacity", &self.cpu_capacity),
            ("cpuAllocatable", &self.cpu_allocatable),
            ("memoryCapacity", &self.memory_capacity),
            ("memoryAllocatable", &self.memory_allocatable),
            ("podCapacity", &self.pod_capacity),
            ("podAllocatable", &self.pod_allocatable),
            ("ephemeralStorageCapacity", &self.ephemeral_storage_capacity),
            ("ephemeralStorageAllocatable", &self.ephemeral_storage_allocatable),
        ];
        for (property, minimum) in minimums {
            let actual = node.quantity(property, None)?;
            if !at_least(actual, minimum.as_deref(), property)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Whether `actual` meets `minimum`. No minimum always passes; a missing
/// value is treated as zero.
fn at_least(actual: Option<Quantity>, minimum: Option<&str>, filter: &str) -> Result<bool> {
    let Some(minimum) = minimum.filter(|m| !m.is_empty()) else {
        return Ok(true);
    };
    let minimum = Quantity::parse(minimum).with_context(|| format!("failed to parse filter {}", filter))?;
    Ok(actual.unwrap_or(Quantity::ZERO) >= minimum)
}

/// The nodes an analyzer's filters select.
pub fn filter_nodes(nodes: &[Node], filters: Option<&NodeResourceFilters>) -> Result<Vec<Node>> {
    let Some(filters) = filters else {
        return Ok(nodes.to_vec());
    };
    let mut matching = Vec::new();
    for node in nodes {
        if filters
            .matches(node)
            .with_context(|| format!("failed to check if node {} matches filters", node.metadata.name))?
        {
            matching.push(node.clone());
        }
    }
    Ok(matching)
}

/// Evaluates clauses against the nodes that passed the filters.
#[derive(Debug, Clone, Default)]
pub struct NodeResourcesEvaluator {
    /// Resource selected by `filters.resourceName`.
    pub resource_name: Option<String>,
}

impl NodeResourcesEvaluator {
    pub fn new(resource_name: Option<String>) -> Self {
        Self { resource_name }
    }

    fn aggregate(&self, function: &str, property: &str, nodes: &[Node]) -> Result<Option<Quantity>> {
        let mut values = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(q) = node.quantity(property, self.resource_name.as_deref())? {
                values.push(q);
            }
        }
        Ok(match function {
            "sum" => Some(values.into_iter().sum()),
            "min" => values.into_iter().min(),
            _ => values.into_iter().max(),
        })
    }
}

impl Evaluator for NodeResourcesEvaluator {
    type Data = [Node];

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("nodeResources").default_operand("count()")
    }

    fn evaluate_clause(&self, clause: &Conditional, nodes: &[Node]) -> Result<bool> {
        let op = clause.operator()?;
        let caps = FUNCTION_REGEX
            .captures(&clause.operand)
            .ok_or_else(|| AnalyzeError::unknown_operand("nodeResources", clause.operand.as_str()))?;
        let function = caps.get(1).map_or("", |m| m.as_str());
        let argument = caps.get(2).map_or("", |m| m.as_str()).trim();

        let actual = match function {
            "count" => Some(Quantity::from_units(nodes.len() as i64)),
            "min" | "max" | "sum" => self.aggregate(function, argument, nodes)?,
            "nodeCondition" => {
                if argument.is_empty() {
                    return Err(AnalyzeError::malformed(
                        clause.to_string(),
                        "nodeCondition requires a condition type",
                    ));
                }
                let any = nodes.iter().any(|n| n.has_condition(argument, &clause.literal));
                return match op {
                    ComparisonOperator::Equal => Ok(any),
                    ComparisonOperator::NotEqual => Ok(!any),
                    _ => Err(AnalyzeError::unsupported_operator(op, "nodeCondition")),
                };
            }
            other => return Err(AnalyzeError::unknown_operand("nodeResources", format!("{}()", other))),
        };

        let desired = Quantity::parse(&clause.literal)?;
        Ok(actual.is_some_and(|actual| op.compare(&actual, &desired)))
    }
}
