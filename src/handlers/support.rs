use crate::analyzer::EvaluatorKind;
use crate::analyzer::spec::SUPPORTED_ANALYZERS;

pub fn handle_support() -> crate::Result<()> {
    println!("Supported analyzers:");
    for (i, name) in SUPPORTED_ANALYZERS.iter().enumerate() {
        let branch = if i + 1 == SUPPORTED_ANALYZERS.len() { "└──" } else { "├──" };
        println!("{} {}", branch, name);
    }

    println!("\nEvaluators (for `eval --evaluator`):");
    for (i, kind) in EvaluatorKind::ALL.iter().enumerate() {
        let branch = if i + 1 == EvaluatorKind::ALL.len() { "└──" } else { "├──" };
        println!("{} {}", branch, kind);
    }

    Ok(())
}
