//! Server inventory: which servers exist, what they run, and where each
//! user's logs live.
//!
//! Read-only here; the inventory is maintained by a separate editing tool.
//! The on-disk shape is:
//!
//! ```text
//! { "<server>": { "os": "linux" | "windows",
//!                 "users": { "<user>": [ { "log_base_path": "...",
//!                                          "log_folder": "...",
//!                                          "include_patterns": [...],
//!                                          "exclude_patterns": [...] } ] } } }
//! ```
//!
//! Maps keep file order so runs are deterministic.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, read_json};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    servers: IndexMap<String, ServerRecord>,
}

impl Inventory {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Servers in file order.
    pub fn servers(&self) -> impl Iterator<Item = (&str, &ServerRecord)> {
        self.servers.iter().map(|(name, record)| (name.as_str(), record))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Raw OS name; see [`crate::platform::OsType::parse`].
    #[serde(default = "default_os")]
    pub os: String,

    /// User name → path entries, in file order.
    #[serde(default)]
    pub users: IndexMap<String, Vec<LogPathEntry>>,
}

fn default_os() -> String {
    "linux".to_string()
}

/// One base directory plus filename filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogPathEntry {
    #[serde(rename = "log_base_path", default)]
    pub base_path: Option<String>,

    /// Informational only.
    #[serde(default)]
    pub log_folder: String,

    #[serde(default)]
    pub include_patterns: Vec<String>,

    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl LogPathEntry {
    /// The base path, if present and not blank.
    pub fn base_path(&self) -> Option<&str> {
        self.base_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}
