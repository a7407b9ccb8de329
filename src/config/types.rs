use super::ConfigError;
use crate::analyzer::{FailOn, OutputFormat};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// `fail`, `warn` or `never`
    pub fail_on: String,
    pub parallel: bool,
    pub skip_not_found: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fail_on: FailOn::default().to_string(),
            parallel: true,
            skip_not_found: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `plain`, `json` or `github`
    pub format: String,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "plain".to_string(),
            color: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fail_on()?;
        self.output_format()?;
        Ok(())
    }

    pub fn fail_on(&self) -> Result<FailOn, ConfigError> {
        FailOn::parse(&self.analysis.fail_on).ok_or_else(|| ConfigError::InvalidValue {
            key: "analysis.fail_on",
            value: self.analysis.fail_on.clone(),
        })
    }

    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        OutputFormat::parse(&self.output.format).ok_or_else(|| ConfigError::InvalidValue {
            key: "output.format",
            value: self.output.format.clone(),
        })
    }
}
