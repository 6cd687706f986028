//! The three lifecycle operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::platform::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Pull compressed logs into the local archive.
    Archive,

    /// Compress logs in place on the server.
    Compress,

    /// Remove logs from the server.
    Delete,
}

impl Operation {
    /// Which files discovery lists for this operation.
    pub fn listing(self) -> Listing {
        match self {
            Self::Archive => Listing::Compressed,
            Self::Compress => Listing::Uncompressed,
            Self::Delete => Listing::All,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Archive => "archive",
            Self::Compress => "compress",
            Self::Delete => "delete",
        })
    }
}
