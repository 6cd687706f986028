//! Eligibility: decide, per discovered file, whether the active operation
//! applies to it.
//!
//! Checks run in a fixed order and the first failing one names the reason:
//! include patterns, exclude patterns, filename date, age. Exclusion is
//! evaluated after inclusion, so a file matching both is excluded.
//!
//! The filter is pure. "Today" is captured once per run by the caller and
//! passed in as a cutoff date, so every file in a run is judged against the
//! same day.

use jiff::{Span, civil::Date};

use crate::model::{DiscoveredFile, EligibilityDecision, Reason};
use crate::pattern::{PatternError, PatternSet};
use crate::platform::Platform;

/// Include/exclude filters for one path entry.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub include: PatternSet,
    pub exclude: PatternSet,
}

impl Rules {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, PatternError> {
        Ok(Self {
            include: PatternSet::new(include)?,
            exclude: PatternSet::new(exclude)?,
        })
    }
}

/// The last day a file may be dated and still qualify.
pub fn cutoff(today: Date, threshold_days: u16) -> Date {
    today.saturating_sub(Span::new().days(i64::from(threshold_days)))
}

/// Judge every file, preserving input order.
pub fn filter(
    files: Vec<DiscoveredFile>,
    rules: &Rules,
    platform: &dyn Platform,
    cutoff: Date,
) -> Vec<EligibilityDecision> {
    files
        .into_iter()
        .map(|file| judge(file, rules, platform, cutoff))
        .collect()
}

pub fn judge(
    file: DiscoveredFile,
    rules: &Rules,
    platform: &dyn Platform,
    cutoff: Date,
) -> EligibilityDecision {
    let decide = |file, reason, date| EligibilityDecision { file, reason, date };

    if !rules.include.is_empty() && !rules.include.matches(&file.filename) {
        return decide(file, Reason::PatternNotIncluded, None);
    }
    if !rules.exclude.is_empty() && rules.exclude.matches(&file.filename) {
        return decide(file, Reason::PatternExcluded, None);
    }

    let Some(date) = platform.extract_date(&file.filename) else {
        return decide(file, Reason::DateUnparseable, None);
    };

    // Inclusive: a file dated exactly on the cutoff qualifies.
    if date <= cutoff {
        decide(file, Reason::Eligible, Some(date))
    } else {
        decide(file, Reason::TooRecent, Some(date))
    }
}
