//! Running a spec's analyzers against a bundle.
//!
//! Analyzers are independent, so they run on the rayon pool unless
//! `parallel` is off. Results keep spec order either way.

use crate::analyzer::checks::Analyzer;
use crate::analyzer::provider::FileProvider;
use crate::analyzer::spec::AnalyzerSpec;
use crate::analyzer::types::{AnalyzeResult, OutcomeKind};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict at or above which a run is considered failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    #[default]
    Fail,
    Warn,
    Never,
}

impl FailOn {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fail" | "error" => Some(Self::Fail),
            "warn" | "warning" => Some(Self::Warn),
            "never" | "none" => Some(Self::Never),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Warn => "warn",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for FailOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Run analyzers on the rayon pool.
    pub parallel: bool,
    /// Treat a missing artifact as "nothing to analyze" instead of an error.
    pub skip_not_found: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            skip_not_found: true,
        }
    }
}

/// Counts over a report's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub total: usize,
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
    pub inconclusive: usize,
    /// Analyzers that errored; each also appears as a failed result.
    pub errors: usize,
    /// Analyzers switched off by `exclude`.
    pub excluded: usize,
    /// Analyzers whose artifact wasn't in the bundle.
    pub not_found: usize,
}

/// Everything one run produced.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub results: Vec<AnalyzeResult>,
    pub summary: AnalysisSummary,
}

impl AnalysisReport {
    pub fn has_failures(&self) -> bool {
        self.summary.fail > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.summary.warn > 0
    }

    /// The most severe verdict in the report.
    pub fn max_verdict(&self) -> Option<OutcomeKind> {
        self.results.iter().filter_map(|r| r.verdict()).max()
    }

    /// Whether the run should exit non-zero. A failed strict result always
    /// fails the run.
    pub fn should_fail(&self, threshold: FailOn) -> bool {
        if self.results.iter().any(|r| r.strict && r.is_fail) {
            return true;
        }
        match (threshold, self.max_verdict()) {
            (FailOn::Never, _) | (_, None) => false,
            (FailOn::Fail, Some(max)) => max >= OutcomeKind::Fail,
            (FailOn::Warn, Some(max)) => max >= OutcomeKind::Warn,
        }
    }
}

enum Run {
    Excluded,
    NotFound,
    Results(Vec<AnalyzeResult>),
    Error(AnalyzeResult),
}

fn run_one(analyzer: &dyn Analyzer, provider: &dyn FileProvider, options: &AnalyzeOptions) -> Run {
    let title = analyzer.title();
    match analyzer.is_excluded() {
        Ok(true) => {
            info!("Excluding \"{}\" analyzer", title);
            return Run::Excluded;
        }
        Ok(false) => {}
        Err(e) => {
            warn!("{}: invalid exclude setting: {}", title, e);
            return Run::Error(AnalyzeResult::error(title, e.to_string()));
        }
    }

    match analyzer.analyze(provider) {
        Ok(results) => {
            debug!("{}: {} result(s)", title, results.len());
            Run::Results(results)
        }
        Err(e) if options.skip_not_found && e.is_not_found() => {
            info!("{}: skipped, {}", title, e);
            Run::NotFound
        }
        Err(e) => {
            warn!("{}: {}", title, e);
            Run::Error(AnalyzeResult::error(title, e.to_string()))
        }
    }
}

/// Run every analyzer of `spec` against `provider`.
pub fn analyze(spec: &AnalyzerSpec, provider: &dyn FileProvider, options: &AnalyzeOptions) -> AnalysisReport {
    analyze_all(&spec.analyzers, provider, options)
}

/// Run a list of analyzers against `provider`.
pub fn analyze_all(
    analyzers: &[Box<dyn Analyzer>],
    provider: &dyn FileProvider,
    options: &AnalyzeOptions,
) -> AnalysisReport {
    let runs: Vec<Run> = if options.parallel {
        analyzers
            .par_iter()
            .map(|a| run_one(a.as_ref(), provider, options))
            .collect()
    } else {
        analyzers
            .iter()
            .map(|a| run_one(a.as_ref(), provider, options))
            .collect()
    };

    let mut report = AnalysisReport::default();
    for run in runs {
        match run {
            Run::Excluded => report.summary.excluded += 1,
            Run::NotFound => report.summary.not_found += 1,
            Run::Results(results) => report.results.extend(results),
            Run::Error(result) => {
                report.summary.errors += 1;
                report.results.push(result);
            }
        }
    }

    for result in &report.results {
        match result.verdict() {
            Some(OutcomeKind::Pass) => report.summary.pass += 1,
            Some(OutcomeKind::Warn) => report.summary.warn += 1,
            Some(OutcomeKind::Fail) => report.summary.fail += 1,
            None => report.summary.inconclusive += 1,
        }
    }
    report.summary.total = report.results.len();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::checks::{HostCpuAnalyzer, HostMemoryAnalyzer, RegistryImagesAnalyzer};
    use crate::analyzer::provider::MemoryBundle;
    use crate::analyzer::types::{BoolOrString, Outcome};

    fn bundle() -> MemoryBundle {
        MemoryBundle::new()
            .with_file("host-collectors/system/cpu.json", r#"{"logicalCount": 2, "physicalCount": 2}"#)
            .with_file("host-collectors/system/memory.json", r#"{"total": 8589934592}"#)
    }

    fn analyzers() -> Vec<Box<dyn Analyzer>> {
        let mut excluded = HostMemoryAnalyzer::new(vec![Outcome::pass("", "ok")]);
        excluded.meta.exclude = Some(BoolOrString::String("true".to_string()));
        vec![
            Box::new(HostCpuAnalyzer::new(vec![
                Outcome::fail("count < 2", "too few"),
                Outcome::warn("count < 4", "few"),
                Outcome::pass("", "plenty"),
            ])),
            Box::new(HostMemoryAnalyzer::new(vec![Outcome::fail("total >= lots", "bad clause")])),
            Box::new(excluded),
            Box::new(RegistryImagesAnalyzer {
                outcomes: vec![Outcome::pass("", "ok")],
                ..RegistryImagesAnalyzer::default()
            }),
        ]
    }

    #[test]
    fn test_report_counts() {
        for parallel in [true, false] {
            let options = AnalyzeOptions {
                parallel,
                ..AnalyzeOptions::default()
            };
            let report = analyze_all(&analyzers(), &bundle(), &options);
            assert_eq!(report.summary.total, 2);
            assert_eq!(report.summary.warn, 1);
            assert_eq!(report.summary.fail, 1);
            assert_eq!(report.summary.errors, 1);
            assert_eq!(report.summary.excluded, 1);
            assert_eq!(report.summary.not_found, 1);
            assert_eq!(report.results[0].title, "Number of CPUs");
            assert!(report.results[1].message.contains("failed to compare"));
        }
    }

    #[test]
    fn test_not_found_as_error() {
        let options = AnalyzeOptions {
            skip_not_found: false,
            ..AnalyzeOptions::default()
        };
        let report = analyze_all(&analyzers()[3..], &bundle(), &options);
        assert_eq!(report.summary.errors, 1);
        assert!(report.results[0].is_fail);
    }

    #[test]
    fn test_should_fail() {
        let report = analyze_all(&analyzers()[..1], &bundle(), &AnalyzeOptions::default());
        assert_eq!(report.max_verdict(), Some(OutcomeKind::Warn));
        assert!(!report.should_fail(FailOn::Fail));
        assert!(report.should_fail(FailOn::Warn));
        assert!(!report.should_fail(FailOn::Never));

        let mut strict = report.clone();
        strict.results[0].is_warn = false;
        strict.results[0].is_fail = true;
        strict.results[0].strict = true;
        assert!(strict.should_fail(FailOn::Never));
    }

    #[test]
    fn test_fail_on_parse() {
        assert_eq!(FailOn::parse("WARN"), Some(FailOn::Warn));
        assert_eq!(FailOn::parse("never"), Some(FailOn::Never));
        assert_eq!(FailOn::parse("sometimes"), None);
    }
}
