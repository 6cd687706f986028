//! Files found on a remote server.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// A remote file found by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredFile {
    /// Absolute path on the remote server.
    pub path: String,

    /// Bare filename, derived from `path`.
    pub filename: String,
}

impl DiscoveredFile {
    pub fn new(path: impl Into<String>, platform: &dyn Platform) -> Self {
        let path = path.into();
        let filename = platform.file_name(&path).to_string();
        Self { path, filename }
    }
}
