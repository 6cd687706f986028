//! Eligibility decisions: why a file was or wasn't acted on.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::DiscoveredFile;

/// Why a file was judged the way it was. Exactly one per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    /// Include patterns were given and none matched.
    PatternNotIncluded,

    /// An exclude pattern matched.
    PatternExcluded,

    /// No date could be recovered from the filename.
    DateUnparseable,

    /// The filename date is after the cutoff.
    TooRecent,

    Eligible,
}

impl Reason {
    pub const ALL: [Self; 5] = [
        Self::Eligible,
        Self::TooRecent,
        Self::DateUnparseable,
        Self::PatternExcluded,
        Self::PatternNotIncluded,
    ];
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PatternNotIncluded => "not included",
            Self::PatternExcluded => "excluded",
            Self::DateUnparseable => "date unparseable",
            Self::TooRecent => "too recent",
            Self::Eligible => "eligible",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityDecision {
    pub file: DiscoveredFile,
    pub reason: Reason,

    /// The filename date, when one was recovered.
    pub date: Option<Date>,
}

impl EligibilityDecision {
    pub fn is_eligible(&self) -> bool {
        self.reason == Reason::Eligible
    }
}
