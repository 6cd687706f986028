//! Run report: everything one invocation saw and did.

use std::fmt;

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

use super::{ActionOutcome, EligibilityDecision, Operation, OutcomeStatus, Reason};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub operation: Operation,
    pub dry_run: bool,
    pub started_at: Timestamp,

    /// The day every file in this run was judged against.
    pub today: Date,

    /// Files dated on or before this day were eligible.
    pub cutoff: Date,

    /// One per processed path entry, in inventory order.
    pub units: Vec<UnitReport>,

    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.units.iter().flat_map(|u| u.outcomes.iter())
    }

    pub fn decisions(&self) -> impl Iterator<Item = &EligibilityDecision> {
        self.units.iter().flat_map(|u| u.decisions.iter())
    }

    pub fn count_reason(&self, reason: Reason) -> usize {
        self.decisions().filter(|d| d.reason == reason).count()
    }

    pub fn count_status(&self, status: OutcomeStatus) -> usize {
        self.outcomes().filter(|o| o.status == status).count()
    }
}

/// One (server, user, path entry) unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitReport {
    pub server: String,
    pub user: String,
    pub base_path: String,
    pub log_folder: String,

    /// Number of files the listing returned.
    pub discovered: usize,

    /// One per discovered file, in listing order.
    pub decisions: Vec<EligibilityDecision>,

    /// One per eligible file, in listing order.
    pub outcomes: Vec<ActionOutcome>,
}

/// Something that went wrong outside a single file's action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub server: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, server: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            server: server.to_string(),
            user: None,
            base_path: None,
            message: message.into(),
        }
    }

    pub fn user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    pub fn base_path(mut self, base_path: &str) -> Self {
        self.base_path = Some(base_path.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// The server has no entry in the credential store.
    UnknownServer,

    /// The inventory names an OS the engine can't drive.
    UnsupportedOs,

    /// The key for a server/user pair is missing or unreadable.
    Credential,

    /// A path entry was rejected before discovery.
    InvalidEntry,

    /// The listing command failed; the entry was treated as empty.
    Discovery,

    /// A filename carried no recognizable date.
    DateUnparseable,

    /// The run was interrupted before this unit started.
    Cancelled,

    /// A server's task stopped abnormally and its results were lost.
    WorkerFailed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnknownServer => "unknown server",
            Self::UnsupportedOs => "unsupported os",
            Self::Credential => "credential",
            Self::InvalidEntry => "invalid entry",
            Self::Discovery => "discovery",
            Self::DateUnparseable => "date unparseable",
            Self::Cancelled => "cancelled",
            Self::WorkerFailed => "worker failed",
        })
    }
}
