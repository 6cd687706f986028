//! Core data model for a lifecycle run.
//!
//! Nothing here outlives one invocation: files are discovered, judged, acted
//! on, and the results are collected into a [`RunReport`].

mod decision;
mod file;
mod operation;
mod outcome;
mod report;

pub use decision::{EligibilityDecision, Reason};
pub use file::DiscoveredFile;
pub use operation::Operation;
pub use outcome::{ActionOutcome, OutcomeStatus};
pub use report::{Diagnostic, DiagnosticKind, RunReport, UnitReport};
