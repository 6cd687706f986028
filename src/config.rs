//! Logsweep configuration.
//!
//! Loaded from `~/.logsweep/config.toml`, or from the file named by
//! `--config`. Every key has a default, so a missing default file is fine;
//! a missing file that was named explicitly is an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::Operation;

/// Errors that abort a run before any remote interaction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("file '{}' not found", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid config at {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid config at {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Logsweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Server inventory (JSON).
    pub inventory: PathBuf,

    /// Credential store mapping server and user to a private key (JSON).
    pub keys: PathBuf,

    /// Local root that archived files are mirrored under.
    pub archive_root: PathBuf,

    /// Servers processed in parallel.
    pub workers: usize,

    /// Limit for a single remote command.
    pub command_timeout_secs: u64,

    /// Limit for a single archive transfer.
    pub transfer_timeout_secs: u64,

    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory: PathBuf::from("inventory.json"),
            keys: PathBuf::from("server_user_keys.json"),
            archive_root: PathBuf::from("/logs/archival"),
            workers: 4,
            command_timeout_secs: 60,
            transfer_timeout_secs: 300,
            thresholds: Thresholds::default(),
        }
    }
}

/// Minimum filename age in days, per operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub archive: u16,
    pub compress: u16,
    pub delete: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            archive: 7,
            compress: 5,
            delete: 15,
        }
    }
}

impl Thresholds {
    pub fn days(&self, operation: Operation) -> u16 {
        match operation {
            Operation::Archive => self.archive,
            Operation::Compress => self.compress,
            Operation::Delete => self.delete,
        }
    }
}

impl Config {
    /// Load config from `explicit`, or from the default path if there is one.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Missing(path.to_path_buf()));
                }
                path.to_path_buf()
            }
            None => match Self::path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.clone(),
            source,
        })?;

        config.validate(&path)?;
        Ok(config)
    }

    /// The default config file path: `~/.logsweep/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".logsweep").join("config.toml"))
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if self.workers == 0 {
            return Err(invalid("workers must be at least 1"));
        }
        if self.command_timeout_secs == 0 || self.transfer_timeout_secs == 0 {
            return Err(invalid("timeouts must be at least one second"));
        }
        if self.archive_root.as_os_str().is_empty() {
            return Err(invalid("archive-root is empty"));
        }
        Ok(())
    }
}

/// Read and parse a JSON file, treating absence as its own error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_match_the_lifecycle_policy() {
        let config = Config::default();
        assert_eq!(config.thresholds.days(Operation::Archive), 7);
        assert_eq!(config.thresholds.days(Operation::Compress), 5);
        assert_eq!(config.thresholds.days(Operation::Delete), 15);
        assert_eq!(config.archive_root, PathBuf::from("/logs/archival"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.toml",
            "archive-root = \"/srv/archive\"\nworkers = 8\n\n[thresholds]\ndelete = 30\n",
        );

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.archive_root, PathBuf::from("/srv/archive"));
        assert_eq!(config.workers, 8);
        assert_eq!(config.thresholds.delete, 30);
        assert_eq!(config.thresholds.archive, 7);
        assert_eq!(config.command_timeout_secs, 60);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.toml", "workers = \"many\"");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.toml", "workers = 0");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn read_json_reports_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();

        let err = read_json::<serde_json::Value>(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));

        let path = write(&dir, "bad.json", "{ not json");
        let err = read_json::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }
}
