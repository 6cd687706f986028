//! Compress: replace a file with its compressed form, in the same directory.
//!
//! On Linux this is one `gzip`. On Windows it is two commands, archive then
//! remove, and a failure between them leaves both files on the server. That
//! case is reported as partial, never as success.

use async_trait::async_trait;
use tracing::{error, info};

use crate::model::{ActionOutcome, DiscoveredFile, Operation};
use crate::remote::RemoteChannel;

use super::{Executor, Target};

pub struct Compress;

#[async_trait]
impl Executor for Compress {
    fn operation(&self) -> Operation {
        Operation::Compress
    }

    async fn apply(
        &self,
        channel: &dyn RemoteChannel,
        target: &Target<'_>,
        file: &DiscoveredFile,
        dry_run: bool,
    ) -> ActionOutcome {
        let session = &target.session;
        let commands = target.platform.compress(&file.path);

        if dry_run {
            let detail = match &commands.cleanup {
                Some(cleanup) => format!("would run: {} then {cleanup}", commands.compress),
                None => format!("would run: {}", commands.compress),
            };
            info!(
                server = session.server,
                user = session.user,
                path = %file.path,
                "[dry-run] would compress"
            );
            return ActionOutcome::would_apply(&file.path, detail);
        }

        if let Err(e) = channel.execute(session, &commands.compress).await {
            error!(
                server = session.server,
                user = session.user,
                path = %file.path,
                "compression failed: {e}"
            );
            return ActionOutcome::failed(&file.path, format!("compression failed: {e}"));
        }

        let Some(cleanup) = &commands.cleanup else {
            info!(
                server = session.server,
                user = session.user,
                path = %file.path,
                "compressed"
            );
            return ActionOutcome::applied(&file.path, "compressed in place");
        };

        match channel.execute(session, cleanup).await {
            Ok(_) => {
                info!(
                    server = session.server,
                    user = session.user,
                    path = %file.path,
                    "compressed"
                );
                ActionOutcome::applied(&file.path, "compressed and original removed")
            }
            Err(e) => {
                error!(
                    server = session.server,
                    user = session.user,
                    path = %file.path,
                    "compressed copy created but original could not be removed, cleanup required: {e}"
                );
                ActionOutcome::partial(
                    &file.path,
                    format!(
                        "compressed copy created but original could not be removed, \
                         both now exist and need cleanup: {e}"
                    ),
                )
            }
        }
    }
}
