//! Runtime configuration loaded from `quotebook.toml`.
//!
//! # Invariants
//! - Every field is optional in the file; missing fields take defaults.
//! - A missing file is not an error; callers get `Ok(None)`.
//! - `validate` must pass before values reach the sync layer.

use crate::logging::LogLevel;
use crate::sync::remote_source::{
    DEFAULT_BATCH_SIZE, DEFAULT_FETCH_TIMEOUT, DEFAULT_REMOTE_CATEGORY, DEFAULT_REMOTE_ENDPOINT,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "quotebook.toml";
pub const DEFAULT_DATABASE_FILE: &str = "quotebook.sqlite3";
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

/// Configuration load/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotebookConfig {
    pub database_path: PathBuf,
    pub remote_endpoint: String,
    pub remote_batch_size: usize,
    /// Sentinel category assigned to every fetched quote.
    pub remote_category: String,
    pub fetch_timeout_secs: u64,
    pub sync_interval_secs: u64,
    pub seed_starter_quotes: bool,
    pub log_level: Option<String>,
    /// Absolute directory for rolling logs; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for QuotebookConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            remote_endpoint: DEFAULT_REMOTE_ENDPOINT.to_string(),
            remote_batch_size: DEFAULT_BATCH_SIZE,
            remote_category: DEFAULT_REMOTE_CATEGORY.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            seed_starter_quotes: true,
            log_level: None,
            log_dir: None,
        }
    }
}

impl QuotebookConfig {
    /// Parses TOML text; absent keys keep their defaults.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("remote_endpoint cannot be empty".into()));
        }
        if self.remote_category.trim().is_empty() {
            return Err(ConfigError::Invalid("remote_category cannot be empty".into()));
        }
        if self.remote_batch_size == 0 {
            return Err(ConfigError::Invalid("remote_batch_size must be > 0".into()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be > 0".into()));
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid("sync_interval_secs must be > 0".into()));
        }
        if let Some(level) = &self.log_level {
            level
                .parse::<LogLevel>()
                .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Configured level, or the build default when unset or invalid.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(LogLevel::build_default)
    }
}

/// Loads `path` (or `quotebook.toml`), returning `Ok(None)` when absent.
pub fn load_config(path: Option<&Path>) -> Result<Option<QuotebookConfig>, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    QuotebookConfig::from_toml_str(&contents, &path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError, QuotebookConfig};
    use crate::logging::LogLevel;
    use std::path::Path;

    #[test]
    fn empty_file_yields_defaults() {
        let config = QuotebookConfig::from_toml_str("", Path::new("inline")).unwrap();
        assert_eq!(config, QuotebookConfig::default());
        assert_eq!(config.remote_batch_size, 5);
        assert_eq!(config.remote_category, "Server");
        assert_eq!(config.fetch_timeout().as_secs(), 5);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = QuotebookConfig::from_toml_str(
            "sync_interval_secs = 60\nlog_level = \"warn\"\n",
            Path::new("inline"),
        )
        .unwrap();
        assert_eq!(config.sync_interval_secs, 60);
        assert_eq!(config.log_level(), LogLevel::Warn);
        assert!(config.seed_starter_quotes);
    }

    #[test]
    fn rejects_zero_interval_and_unknown_level() {
        let zero = QuotebookConfig::from_toml_str("sync_interval_secs = 0", Path::new("inline"));
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));

        let level = QuotebookConfig::from_toml_str("log_level = \"loud\"", Path::new("inline"));
        assert!(matches!(level, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = QuotebookConfig::from_toml_str("remote_batch_size = [", Path::new("x.toml"));
        assert!(matches!(err, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_config_returns_none_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_config(Some(&missing)).unwrap().is_none());

        let present = dir.path().join("quotebook.toml");
        std::fs::write(&present, "remote_batch_size = 3\n").unwrap();
        let config = load_config(Some(&present)).unwrap().unwrap();
        assert_eq!(config.remote_batch_size, 3);
    }
}
