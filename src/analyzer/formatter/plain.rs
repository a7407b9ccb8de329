//! Plain text formatter.

use crate::analyzer::engine::AnalysisReport;
use crate::analyzer::types::{AnalyzeResult, OutcomeKind};
use colored::Colorize;

fn label(result: &AnalyzeResult) -> String {
    match result.verdict() {
        Some(OutcomeKind::Pass) => "PASS".green().bold().to_string(),
        Some(OutcomeKind::Warn) => "WARN".yellow().bold().to_string(),
        Some(OutcomeKind::Fail) => "FAIL".red().bold().to_string(),
        None => "----".dimmed().to_string(),
    }
}

/// Format a report as plain text.
pub fn format(report: &AnalysisReport) -> String {
    let mut output = String::new();

    for result in &report.results {
        let strict = if result.strict { " (strict)" } else { "" };
        output.push_str(&format!("[{}] {}{}\n", label(result), result.title.bold(), strict));

        for line in result.message.lines() {
            output.push_str(&format!("    {}\n", line));
        }
        if !result.uri.is_empty() {
            output.push_str(&format!("    See: {}\n", result.uri.cyan()));
        }
    }

    let s = &report.summary;
    if report.results.is_empty() {
        output.push_str("No analyzer produced a result.\n");
    } else {
        output.push_str(&format!(
            "\n{} result(s): {} passed, {} warned, {} failed, {} inconclusive\n",
            s.total, s.pass, s.warn, s.fail, s.inconclusive
        ));
    }
    if s.errors > 0 || s.excluded > 0 || s.not_found > 0 {
        output.push_str(&format!(
            "{} analyzer error(s), {} excluded, {} without collected data\n",
            s.errors, s.excluded, s.not_found
        ));
    }

    output
}

/// Format for GitHub Actions annotations. Passing and inconclusive results
/// are not annotated.
pub fn format_github(report: &AnalysisReport) -> String {
    let mut output = String::new();

    for result in &report.results {
        let level = match result.verdict() {
            Some(OutcomeKind::Fail) => "error",
            Some(OutcomeKind::Warn) => "warning",
            _ => continue,
        };
        // annotations are single-line
        let message = result.message.replace('\n', " ");
        output.push_str(&format!("::{} title={}::{}\n", level, result.title, message));
    }

    output
}
