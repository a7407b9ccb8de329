use anyhow::Context;
use bundle_analyzer::{
    cli::{Cli, Commands},
    handlers::{RunOptions, handle_eval, handle_run, handle_support},
};
use clap::Parser;
use std::process;

/// Analysis completed but failed at the requested threshold.
const EXIT_FAILED: i32 = 1;
/// The analysis itself could not run.
const EXIT_ERROR: i32 = 2;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_FAILED),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(EXIT_ERROR);
        }
    }
}

/// Returns `false` when the command ran but its verdict should fail the process.
fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run {
            bundle,
            spec,
            format,
            fail_on,
            sequential,
            strict_not_found,
            no_color,
        } => {
            let context = format!("failed to analyze bundle {}", bundle.display());
            let options = RunOptions {
                bundle,
                spec,
                format,
                fail_on,
                sequential,
                strict_not_found,
                no_color,
            };
            let failed = handle_run(options, config_path).context(context)?;
            Ok(!failed)
        }
        Commands::Eval { evaluator, when, data } => {
            handle_eval(&evaluator, &when, &data)?;
            Ok(true)
        }
        Commands::Support => {
            handle_support()?;
            Ok(true)
        }
    }
}
