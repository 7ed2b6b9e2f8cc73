//! # Terminal Configuration
//!
//! Where the store lives, how loud the logs are, and how the session behaves.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (highest priority)                                    │
//! │     --db ./shop.db                                                     │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     TALLY_DB_PATH, TALLY_LOG, TALLY_EXPORT_DIR, TALLY_CONFIRM          │
//! │                                                                         │
//! │  3. TOML Config File (--config, or the platform default)               │
//! │     ~/.config/pos/config.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.tally.pos/config.toml (macOS)    │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/tally/tally.db"
//! max_connections = 5
//!
//! [logging]
//! filter = "info,tally=debug,sqlx=warn"
//!
//! [session]
//! confirm_destructive = true
//! export_dir = "."
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Created on first run.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "tally", "pos")
        .map(|dirs| dirs.data_dir().join("tally.db"))
        .unwrap_or_else(|| PathBuf::from("tally.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins over it.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

pub(crate) fn default_log_filter() -> String {
    "info,tally=debug,sqlx=warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

/// `[session]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Ask before deletes, cart clears, restores and clear-all.
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,

    /// Where exports, backups and saved receipts go when `--dir` is not given.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            confirm_destructive: default_true(),
            export_dir: default_export_dir(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::read(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn read(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.filter) {
            return Err(ConfigError::Invalid(format!("logging.filter: {}", e)));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `TALLY_*` overrides from any variable source.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("TALLY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(filter) = var("TALLY_LOG") {
            self.logging.filter = filter;
        }

        if let Some(dir) = var("TALLY_EXPORT_DIR") {
            debug!(dir = %dir, "Overriding export dir from environment");
            self.session.export_dir = PathBuf::from(dir);
        }

        if let Some(confirm) = var("TALLY_CONFIRM") {
            match confirm.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.session.confirm_destructive = true,
                "0" | "false" | "no" | "off" => self.session.confirm_destructive = false,
                _ => warn!(value = %confirm, "Unknown TALLY_CONFIRM value in environment"),
            }
        }
    }

    /// `config.toml` in the platform config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "pos")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.filter, "info,tally=debug,sqlx=warn");
        assert!(config.session.confirm_destructive);
        assert_eq!(config.session.export_dir, PathBuf::from("."));
        assert!(config.database.path.ends_with("tally.db"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\npath = \"shop.db\"\n").unwrap();

        let config = AppConfig::read(&path).unwrap();
        assert_eq!(config.database.path, PathBuf::from("shop.db"));
        assert_eq!(config.database.max_connections, 5);
        assert!(config.session.confirm_destructive);
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database\npath = ").unwrap();

        let err = AppConfig::load(Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed(_)));
    }

    #[test]
    fn test_save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.database.path = PathBuf::from("/tmp/a.db");
        config.session.confirm_destructive = false;

        let written = config.save(Some(path.clone())).unwrap();
        assert_eq!(written, path);
        assert_eq!(AppConfig::read(&path).unwrap(), config);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TALLY_DB_PATH", "/data/pos.db"),
            ("TALLY_EXPORT_DIR", "/exports"),
            ("TALLY_CONFIRM", "no"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/data/pos.db"));
        assert_eq!(config.session.export_dir, PathBuf::from("/exports"));
        assert!(!config.session.confirm_destructive);
        assert_eq!(config.logging.filter, default_log_filter());
    }

    #[test]
    fn test_unknown_confirm_value_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == "TALLY_CONFIRM").then(|| "maybe".to_string()));
        assert!(config.session.confirm_destructive);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 2;
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("[session]"));
    }
}
