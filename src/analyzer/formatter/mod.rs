//! Output formatters for analysis reports.

pub mod json;
pub mod plain;

use crate::analyzer::engine::AnalysisReport;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text output.
    #[default]
    Plain,
    /// JSON output.
    Json,
    /// GitHub Actions annotations.
    GitHub,
}

impl OutputFormat {
    /// Parse from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Some(Self::Plain),
            "json" => Some(Self::Json),
            "github" | "github-actions" => Some(Self::GitHub),
            _ => None,
        }
    }
}

/// Format a report to a string.
pub fn format_report_to_string(report: &AnalysisReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => plain::format(report),
        OutputFormat::Json => json::format(report),
        OutputFormat::GitHub => plain::format_github(report),
    }
}

/// Format and print a report.
pub fn format_report(report: &AnalysisReport, format: OutputFormat) {
    print!("{}", format_report_to_string(report, format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Plain));
        assert_eq!(OutputFormat::parse("github-actions"), Some(OutputFormat::GitHub));
        assert_eq!(OutputFormat::parse("sarif"), None);
    }
}
