//! # Analyzer Module
//!
//! Outcome-driven analysis of collected support bundles:
//! - `conditional` - when-clause grammar, comparison operators and the evaluator contract
//! - `values` - quantities, durations, percentages and versions used as literals
//! - `evaluators` - one conditional evaluator per kind of collected artifact
//! - `outcome` - first-match resolution of outcome lists
//! - `checks` - analyzers that read an artifact and resolve outcomes against it
//! - `spec` / `engine` / `formatter` - load specs, run them, render reports
//!
//! # Example
//!
//! ```rust,ignore
//! use bundle_analyzer::analyzer::{analyze, AnalyzeOptions, DirectoryBundle, load_spec};
//! use std::path::Path;
//!
//! let spec = load_spec(Path::new("preflight.yaml"))?;
//! let bundle = DirectoryBundle::new("./support-bundle")?;
//! let report = analyze(&spec, &bundle, &AnalyzeOptions::default());
//!
//! for result in &report.results {
//!     println!("{}: {:?} - {}", result.title, result.verdict(), result.message);
//! }
//! ```

pub mod checks;
pub mod conditional;
pub mod engine;
pub mod evaluators;
pub mod formatter;
pub mod outcome;
pub mod provider;
pub mod spec;
pub mod types;
pub mod values;

pub use checks::Analyzer;
pub use conditional::{ComparisonOperator, Evaluator};
pub use engine::{AnalysisReport, AnalysisSummary, AnalyzeOptions, FailOn, analyze, analyze_all};
pub use evaluators::EvaluatorKind;
pub use formatter::{OutputFormat, format_report, format_report_to_string};
pub use outcome::{resolve, resolve_each};
pub use provider::{DirectoryBundle, FileProvider, MemoryBundle};
pub use spec::{AnalyzerSpec, load_spec, parse_spec};
pub use types::{AnalyzeMeta, AnalyzeResult, Outcome, OutcomeKind, SingleOutcome};
