//! Configuration for the review engine
//!
//! Read from `config.toml` in the data directory when present:
//!
//! ```toml
//! due_limit = 50
//! sort_due_by_recall = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "HANZI_REVIEW_DATA_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Could not determine a data directory")]
    DataDirNotFound,

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Maximum number of items returned by a due query
    pub due_limit: usize,
    /// Order due items weakest first instead of by schedule
    pub sort_due_by_recall: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            due_limit: 50,
            sort_due_by_recall: true,
        }
    }
}

impl ReviewConfig {
    /// Load `config.toml` from the data directory, falling back to defaults
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        if config.due_limit == 0 {
            return Err(ConfigError::Invalid("due_limit must be at least 1".to_string()));
        }
        Ok(config)
    }
}

/// Default data directory (e.g. ~/.local/share/hanzi-review)
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|p| p.join("hanzi-review"))
        .ok_or(ConfigError::DataDirNotFound)
}

/// Pick the data directory: explicit override, then environment, then default
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => default_data_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(ReviewConfig::load(temp.path()).unwrap(), ReviewConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "due_limit = 5\n").unwrap();

        let config = ReviewConfig::load(temp.path()).unwrap();
        assert_eq!(config.due_limit, 5);
        assert!(config.sort_due_by_recall);
    }

    #[test]
    fn test_rejects_zero_limit() {
        assert!(matches!(
            ReviewConfig::from_toml("due_limit = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            ReviewConfig::from_toml("due_limit = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = PathBuf::from("/tmp/hanzi-explicit");
        assert_eq!(resolve_data_dir(Some(&dir)).unwrap(), dir);
    }
}
