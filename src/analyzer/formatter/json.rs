//! JSON formatter.

use crate::analyzer::engine::{AnalysisReport, AnalysisSummary};
use crate::analyzer::types::AnalyzeResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Format a report as JSON.
pub fn format(report: &AnalysisReport) -> String {
    format_at(report, Utc::now())
}

fn format_at(report: &AnalysisReport, generated_at: DateTime<Utc>) -> String {
    let output = JsonOutput {
        generated_at,
        results: &report.results,
        summary: &report.summary,
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    generated_at: DateTime<Utc>,
    results: &'a [AnalyzeResult],
    summary: &'a AnalysisSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::types::ObjectReference;
    use chrono::TimeZone;

    #[test]
    fn test_json_shape() {
        let result = AnalyzeResult {
            title: "Amount of Memory - Node a".to_string(),
            message: "Not enough memory".to_string(),
            is_fail: true,
            icon_uri: "https://example.com/icon.svg".to_string(),
            involved_object: Some(ObjectReference::node("a")),
            ..AnalyzeResult::default()
        };
        let report = AnalysisReport {
            results: vec![result],
            summary: AnalysisSummary {
                total: 1,
                fail: 1,
                ..AnalysisSummary::default()
            },
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&format_at(&report, at)).unwrap();

        assert_eq!(value["generatedAt"], "2024-05-01T12:00:00Z");
        assert_eq!(value["results"][0]["isFail"], true);
        assert_eq!(value["results"][0]["iconURI"], "https://example.com/icon.svg");
        assert_eq!(value["results"][0]["involvedObject"]["kind"], "Node");
        assert_eq!(value["summary"]["fail"], 1);
    }
}
