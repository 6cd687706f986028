//! Action executors: apply the terminal effect of an operation to one file.
//!
//! Each executor turns one eligible file into one [`ActionOutcome`]. Errors
//! never escape an executor; they become failed or partial outcomes so the
//! caller can move on to the next file. In a dry run no command with side
//! effects is issued and the outcome says what would have happened.

mod archive;
mod compress;
mod delete;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

pub use archive::Archive;
pub use compress::Compress;
pub use delete::Delete;

use crate::model::{ActionOutcome, DiscoveredFile, Operation};
use crate::platform::Platform;
use crate::remote::{RemoteChannel, Session};

/// Where an action runs: the session, the target's OS, and the path entry
/// the file was discovered under.
#[derive(Clone, Copy)]
pub struct Target<'a> {
    pub session: Session<'a>,
    pub platform: &'a dyn Platform,
    pub base_path: &'a str,
}

#[async_trait]
pub trait Executor: Send + Sync {
    fn operation(&self) -> Operation;

    async fn apply(
        &self,
        channel: &dyn RemoteChannel,
        target: &Target<'_>,
        file: &DiscoveredFile,
        dry_run: bool,
    ) -> ActionOutcome;
}

/// The executor for `operation`.
pub fn executor(operation: Operation, archive_root: &Path) -> Arc<dyn Executor> {
    match operation {
        Operation::Archive => Arc::new(Archive::new(archive_root)),
        Operation::Compress => Arc::new(Compress),
        Operation::Delete => Arc::new(Delete),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executor_matches_operation() {
        let root = Path::new("/logs/archival");
        for op in [Operation::Archive, Operation::Compress, Operation::Delete] {
            assert_eq!(executor(op, root).operation(), op);
        }
    }
}
