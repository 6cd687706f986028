//! Action outcomes: what happened when an executor ran against one file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeStatus {
    /// The effect was applied.
    Applied,

    /// Dry run: the effect would have been applied.
    WouldApply,

    /// Nothing changed on the target.
    Failed,

    /// The first step succeeded and a later one failed, leaving the target
    /// in a state an operator has to clean up.
    Partial,
}

impl OutcomeStatus {
    pub const ALL: [Self; 4] = [Self::Applied, Self::WouldApply, Self::Failed, Self::Partial];
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Applied => "applied",
            Self::WouldApply => "would apply",
            Self::Failed => "failed",
            Self::Partial => "partial",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    /// Remote path the action targeted.
    pub path: String,
    pub status: OutcomeStatus,
    pub detail: String,
}

impl ActionOutcome {
    pub fn applied(path: &str, detail: impl Into<String>) -> Self {
        Self::with(path, OutcomeStatus::Applied, detail)
    }

    pub fn would_apply(path: &str, detail: impl Into<String>) -> Self {
        Self::with(path, OutcomeStatus::WouldApply, detail)
    }

    pub fn failed(path: &str, detail: impl Into<String>) -> Self {
        Self::with(path, OutcomeStatus::Failed, detail)
    }

    pub fn partial(path: &str, detail: impl Into<String>) -> Self {
        Self::with(path, OutcomeStatus::Partial, detail)
    }

    fn with(path: &str, status: OutcomeStatus, detail: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            status,
            detail: detail.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.status, OutcomeStatus::Applied | OutcomeStatus::WouldApply)
    }
}
