//! Delete: remove the file from the server. There is no undo.

use async_trait::async_trait;
use tracing::{error, info};

use crate::model::{ActionOutcome, DiscoveredFile, Operation};
use crate::remote::RemoteChannel;

use super::{Executor, Target};

pub struct Delete;

#[async_trait]
impl Executor for Delete {
    fn operation(&self) -> Operation {
        Operation::Delete
    }

    async fn apply(
        &self,
        channel: &dyn RemoteChannel,
        target: &Target<'_>,
        file: &DiscoveredFile,
        dry_run: bool,
    ) -> ActionOutcome {
        let session = &target.session;
        let command = target.platform.delete(&file.path);

        if dry_run {
            info!(
                server = session.server,
                user = session.user,
                path = %file.path,
                "[dry-run] would delete"
            );
            return ActionOutcome::would_apply(&file.path, format!("would run: {command}"));
        }

        match channel.execute(session, &command).await {
            Ok(_) => {
                info!(
                    server = session.server,
                    user = session.user,
                    path = %file.path,
                    "deleted"
                );
                ActionOutcome::applied(&file.path, "deleted")
            }
            Err(e) => {
                error!(
                    server = session.server,
                    user = session.user,
                    path = %file.path,
                    "delete failed: {e}"
                );
                ActionOutcome::failed(&file.path, format!("delete failed: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::credentials::Credential;
    use crate::model::OutcomeStatus;
    use crate::platform::{Linux, Platform, Windows};
    use crate::remote::Session;
    use crate::remote::testing::ScriptedChannel;

    async fn run(
        channel: &ScriptedChannel,
        platform: &dyn Platform,
        path: &str,
        dry_run: bool,
    ) -> ActionOutcome {
        let credential = Credential::unchecked("/keys/svc");
        let target = Target {
            session: Session {
                server: "web01",
                user: "svc",
                credential: &credential,
            },
            platform,
            base_path: "/var/log/app",
        };
        let file = DiscoveredFile::new(path, platform);
        Delete.apply(channel, &target, &file, dry_run).await
    }

    #[tokio::test]
    async fn deletes_with_the_platform_command() {
        let channel = ScriptedChannel::new();
        let outcome = run(&channel, &Linux, "/var/log/app/a.2024-01-01.log", false).await;

        assert_eq!(outcome.status, OutcomeStatus::Applied);
        assert_eq!(channel.commands(), ["rm -- '/var/log/app/a.2024-01-01.log'"]);
    }

    #[tokio::test]
    async fn dry_run_issues_no_commands() {
        let channel = ScriptedChannel::new();
        let outcome = run(&channel, &Windows, r"D:\logs\u_ex240101.log", true).await;

        assert_eq!(outcome.status, OutcomeStatus::WouldApply);
        assert!(outcome.detail.contains("Remove-Item"));
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn deleting_twice_fails_the_second_time() {
        let channel = ScriptedChannel::new()
            .reply("rm --", &[])
            .fail("rm --", "rm: cannot remove 'a.log': No such file or directory");

        let first = run(&channel, &Linux, "/var/log/app/a.log", false).await;
        let second = run(&channel, &Linux, "/var/log/app/a.log", false).await;

        assert!(first.succeeded());
        assert_eq!(second.status, OutcomeStatus::Failed);
        assert!(second.detail.contains("No such file or directory"));
    }
}
