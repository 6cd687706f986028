//! Credential store: which private key to use for each server and user.
//!
//! On disk: `{ "<server>": { "users": { "<user>": "/path/to/key" } } }`.
//!
//! A [`Credential`] is only handed out after the key file has been opened
//! successfully. It is scoped to the commands for one (server, user) pair
//! and is dropped when that pair is done.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, read_json};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no SSH keys configured for server '{0}'")]
    UnknownServer(String),

    #[error("no SSH key for {user}@{server}")]
    NoKey { server: String, user: String },

    #[error("SSH key {} for {user}@{server} is not readable: {source}", .path.display())]
    Unreadable {
        server: String,
        user: String,
        path: PathBuf,
        source: io::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialStore {
    servers: IndexMap<String, ServerKeys>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ServerKeys {
    #[serde(default)]
    users: IndexMap<String, PathBuf>,
}

/// A private key that was readable when it was resolved.
#[derive(Debug)]
pub struct Credential {
    key_path: PathBuf,
}

impl Credential {
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }
}

#[cfg(test)]
impl Credential {
    /// A credential that skips the readability check.
    pub(crate) fn unchecked(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }
}

impl CredentialStore {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn knows_server(&self, server: &str) -> bool {
        self.servers.contains_key(server)
    }

    /// Look up the key for `user@server` and check that it can be opened.
    pub fn resolve(&self, server: &str, user: &str) -> Result<Credential, CredentialError> {
        let keys = self
            .servers
            .get(server)
            .ok_or_else(|| CredentialError::UnknownServer(server.to_string()))?;

        let key_path = keys
            .users
            .get(user)
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| CredentialError::NoKey {
                server: server.to_string(),
                user: user.to_string(),
            })?;

        let unreadable = |source| CredentialError::Unreadable {
            server: server.to_string(),
            user: user.to_string(),
            path: key_path.clone(),
            source,
        };

        let file = File::open(key_path).map_err(unreadable)?;
        if !file.metadata().map_err(unreadable)?.is_file() {
            return Err(unreadable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        Ok(Credential {
            key_path: key_path.clone(),
        })
    }
}
