//! Registry image conditionals: `missing > 0`, `verified == 3`, `errors = 0`.

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator, compare_with, parse_int};
use crate::error::{AnalyzeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryImage {
    #[serde(default)]
    pub exists: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Collected image lookups (`registry/<name>.json`), keyed by image reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryInfo {
    #[serde(default)]
    pub images: BTreeMap<String, RegistryImage>,
}

/// Image lookups grouped by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageCounts {
    pub verified: i64,
    pub missing: i64,
    pub errors: i64,
}

impl RegistryInfo {
    /// A lookup that errored counts as an error even if `exists` is set.
    pub fn counts(&self) -> ImageCounts {
        self.images.values().fold(ImageCounts::default(), |mut acc, image| {
            if !image.error.is_empty() {
                acc.errors += 1;
            } else if image.exists {
                acc.verified += 1;
            } else {
                acc.missing += 1;
            }
            acc
        })
    }
}

pub struct RegistryImagesEvaluator;

impl Evaluator for RegistryImagesEvaluator {
    type Data = ImageCounts;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("registryImages")
    }

    fn evaluate_clause(&self, clause: &Conditional, counts: &ImageCounts) -> Result<bool> {
        let actual = match clause.operand.as_str() {
            "verified" => counts.verified,
            "missing" => counts.missing,
            "errors" => counts.errors,
            other => return Err(AnalyzeError::unknown_operand("registryImages", other)),
        };
        compare_with(clause.operator()?, &actual, &clause.literal, parse_int)
    }
}
