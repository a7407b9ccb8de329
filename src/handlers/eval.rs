use crate::analyzer::EvaluatorKind;
use crate::error::{AnalyzeError, ResultExt};
use std::fs;

/// Evaluate one when-clause and print `true` or `false`.
pub fn handle_eval(evaluator: &str, when: &str, data: &str) -> crate::Result<bool> {
    let kind = EvaluatorKind::parse(evaluator).ok_or_else(|| {
        AnalyzeError::Spec(format!(
            "unknown evaluator {:?}, expected one of: {}",
            evaluator,
            EvaluatorKind::ALL.map(|k| k.as_str()).join(", ")
        ))
    })?;

    let bytes = read_data(data)?;
    let matched = kind
        .evaluate_json(when, &bytes)
        .with_context(|| format!("failed to evaluate {:?} with {} evaluator", when, kind))?;

    println!("{}", matched);
    Ok(matched)
}

fn read_data(data: &str) -> crate::Result<Vec<u8>> {
    match data.strip_prefix('@') {
        Some(path) => fs::read(path).with_context(|| format!("failed to read {}", path)),
        None => Ok(data.as_bytes().to_vec()),
    }
}
