//! # Bundle Analyzer
//!
//! Outcome-driven analysis of Kubernetes support bundles. Analyzer specs pair
//! when-clauses such as `count >= 4` or `used/total > 80%` with pass, warn and
//! fail messages; each clause is evaluated against a collected artifact and the
//! first matching outcome becomes the analyzer's result.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bundle_analyzer::analyzer::{analyze, AnalyzeOptions, DirectoryBundle, load_spec};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = load_spec(Path::new("host-preflight.yaml"))?;
//! let bundle = DirectoryBundle::new("./support-bundle")?;
//! let report = analyze(&spec, &bundle, &AnalyzeOptions::default());
//! println!("{} failed", report.summary.fail);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use analyzer::{AnalysisReport, AnalyzeOptions, AnalyzeResult, Analyzer, FileProvider, analyze, load_spec};
pub use error::{AnalyzeError, ErrorKind, Result};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
