pub mod types;

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use types::{AnalysisConfig, Config, OutputConfig};

const CONFIG_FILE_NAME: &str = ".bundle-analyzer.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Get the global config file path (~/.bundle-analyzer.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (<bundle>/.bundle-analyzer.toml)
pub fn local_config_path(bundle_path: &Path) -> PathBuf {
    bundle_path.join(CONFIG_FILE_NAME)
}

/// Read and parse a single config file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    config.validate()?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load configuration.
///
/// An explicit file must exist and parse. Otherwise the bundle directory is
/// checked first, then the home directory, falling back to defaults.
pub fn load_config(explicit: Option<&Path>, bundle_path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let candidates = bundle_path
        .map(local_config_path)
        .into_iter()
        .chain(global_config_path());
    for candidate in candidates {
        if candidate.is_file() {
            return load_config_file(&candidate);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_config_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(
            local_config_path(dir.path()),
            "[analysis]\nfail_on = \"warn\"\nparallel = false\n",
        )
        .unwrap();

        let config = load_config(None, Some(dir.path())).unwrap();
        assert_eq!(config.analysis.fail_on, "warn");
        assert!(!config.analysis.parallel);
        assert!(config.analysis.skip_not_found);
        assert_eq!(config.output.format, "plain");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(dir.path().join("missing.toml").as_path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[output]\nformat = \"sarif\"\n").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("output.format"));

        fs::write(&path, "[analysis\n").unwrap();
        assert!(matches!(load_config_file(&path), Err(ConfigError::Parse { .. })));
    }
}
