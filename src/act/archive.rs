//! Archive: pull a compressed log into the local mirror.
//!
//! Files land at `{root}/{server}/{user}/{dirs below base_path}/{filename}`.
//! The remote original is never touched, so a failed transfer leaves
//! nothing to clean up on the server.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{error, info};

use crate::model::{ActionOutcome, DiscoveredFile, Operation};
use crate::remote::RemoteChannel;

use super::{Executor, Target};

pub struct Archive {
    root: PathBuf,
}

impl Archive {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Local path a remote file is mirrored to.
    pub fn destination(&self, target: &Target<'_>, file: &DiscoveredFile) -> PathBuf {
        let mut dest = self
            .root
            .join(target.session.server)
            .join(target.session.user);
        for dir in target.platform.relative_dirs(target.base_path, &file.path) {
            if dir != ".." {
                dest.push(dir);
            }
        }
        dest.push(&file.filename);
        dest
    }
}

#[async_trait]
impl Executor for Archive {
    fn operation(&self) -> Operation {
        Operation::Archive
    }

    async fn apply(
        &self,
        channel: &dyn RemoteChannel,
        target: &Target<'_>,
        file: &DiscoveredFile,
        dry_run: bool,
    ) -> ActionOutcome {
        let session = &target.session;
        let dest = self.destination(target, file);

        if dry_run {
            info!(
                server = session.server,
                user = session.user,
                path = %file.path,
                "[dry-run] would archive to {}",
                dest.display()
            );
            return ActionOutcome::would_apply(
                &file.path,
                format!("would pull to {}", dest.display()),
            );
        }

        if let Some(parent) = dest.parent() {
            // create_dir_all succeeds on directories that already exist.
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!(path = %file.path, "cannot create {}: {e}", parent.display());
                return ActionOutcome::failed(
                    &file.path,
                    format!("cannot create {}: {e}", parent.display()),
                );
            }
        }

        match channel.pull(session, &file.path, &dest).await {
            Ok(()) => {
                info!(
                    server = session.server,
                    user = session.user,
                    path = %file.path,
                    "archived to {}",
                    dest.display()
                );
                ActionOutcome::applied(&file.path, format!("archived to {}", dest.display()))
            }
            Err(e) => {
                error!(
                    server = session.server,
                    user = session.user,
                    path = %file.path,
                    "archive failed: {e}"
                );
                ActionOutcome::failed(&file.path, format!("transfer failed: {e}"))
            }
        }
    }
}
