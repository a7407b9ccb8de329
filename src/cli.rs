use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bundle-analyze")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run outcome-driven analyzers against a Kubernetes support bundle")]
#[command(long_about = "Loads troubleshoot-style analyzer specs, evaluates each analyzer's when-clauses against the artifacts of an extracted support bundle, and reports pass, warn and fail outcomes.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "BUNDLE_ANALYZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an extracted support bundle
    Run {
        /// Root directory of the extracted bundle
        #[arg(short, long, value_name = "DIR")]
        bundle: PathBuf,

        /// Analyzer spec file (YAML, may hold several documents)
        #[arg(short, long, value_name = "FILE")]
        spec: PathBuf,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Exit non-zero at this verdict or worse (overrides config)
        #[arg(long, value_enum)]
        fail_on: Option<FailOnThreshold>,

        /// Run analyzers one at a time
        #[arg(long)]
        sequential: bool,

        /// Report analyzers whose artifact is missing as errors
        #[arg(long)]
        strict_not_found: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Evaluate one when-clause against one collected artifact
    Eval {
        /// Evaluator name (cpu, memory, diskUsage, cephStatus, ...)
        #[arg(short, long)]
        evaluator: String,

        /// The when-clause, e.g. "count >= 4"
        #[arg(short, long)]
        when: String,

        /// Artifact JSON, or @path to read it from a file
        #[arg(short, long, value_name = "JSON|@FILE")]
        data: String,
    },

    /// List supported analyzers and evaluators
    Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
    Github,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOnThreshold {
    Fail,
    Warn,
    Never,
}

impl From<OutputFormat> for crate::analyzer::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => Self::Plain,
            OutputFormat::Json => Self::Json,
            OutputFormat::Github => Self::GitHub,
        }
    }
}

impl From<FailOnThreshold> for crate::analyzer::FailOn {
    fn from(threshold: FailOnThreshold) -> Self {
        match threshold {
            FailOnThreshold::Fail => Self::Fail,
            FailOnThreshold::Warn => Self::Warn,
            FailOnThreshold::Never => Self::Never,
        }
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
