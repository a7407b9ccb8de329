use crate::analyzer::{AnalyzeOptions, DirectoryBundle, analyze, format_report, load_spec};
use crate::cli::{FailOnThreshold, OutputFormat};
use crate::config;
use log::info;
use std::path::{Path, PathBuf};

pub struct RunOptions {
    pub bundle: PathBuf,
    pub spec: PathBuf,
    pub format: Option<OutputFormat>,
    pub fail_on: Option<FailOnThreshold>,
    pub sequential: bool,
    pub strict_not_found: bool,
    pub no_color: bool,
}

/// Run a spec against a bundle and print the report.
///
/// Returns whether the run failed at the configured threshold.
pub fn handle_run(options: RunOptions, config_path: Option<&Path>) -> crate::Result<bool> {
    let config = config::load_config(config_path, Some(options.bundle.as_path()))?;

    let format = match options.format {
        Some(format) => format.into(),
        None => config.output_format()?,
    };
    let fail_on = match options.fail_on {
        Some(threshold) => threshold.into(),
        None => config.fail_on()?,
    };
    if options.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let spec = load_spec(&options.spec)?;
    if !spec.skipped.is_empty() {
        info!("Skipped unsupported analyzers: {}", spec.skipped.join(", "));
    }
    let bundle = DirectoryBundle::new(&options.bundle)?;

    info!(
        "Running {} analyzer(s) against {}",
        spec.len(),
        options.bundle.display()
    );
    let analyze_options = AnalyzeOptions {
        parallel: config.analysis.parallel && !options.sequential,
        skip_not_found: config.analysis.skip_not_found && !options.strict_not_found,
    };
    let report = analyze(&spec, &bundle, &analyze_options);

    format_report(&report, format);
    Ok(report.should_fail(fail_on))
}
