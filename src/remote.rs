//! Remote command channel: run one command on one server as one user.
//!
//! Every call opens its own session and tears it down; nothing is pooled.
//! There are no retries. A call fails on transport error, non-zero exit, or
//! timeout, and the error carries whatever the remote wrote to stderr.
//!
//! Children run in their own process group, so a terminal Ctrl+C reaches
//! logsweep but not the `ssh`/`rsync` commands already in flight.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

use crate::credentials::Credential;
use crate::platform::{Linux, Platform};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("failed to run {program}: {source}")]
    Transport { program: String, source: io::Error },

    #[error("{}", with_stderr(&exit_label(.code.as_ref().copied()), .stderr))]
    Exit { code: Option<i32>, stderr: String },

    #[error("{}", with_stderr(&format!("timed out after {}s", .after.as_secs()), .stderr))]
    Timeout { after: Duration, stderr: String },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn with_stderr(head: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        head.to_string()
    } else {
        format!("{head} ({stderr})")
    }
}

/// Who a command runs as, and where.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    pub server: &'a str,
    pub user: &'a str,
    pub credential: &'a Credential,
}

impl Session<'_> {
    fn destination(&self) -> String {
        format!("{}@{}", self.user, self.server)
    }
}

/// Transport for remote commands and bulk transfers.
#[async_trait]
pub trait RemoteChannel: Send + Sync {
    /// Run `command` and return its stdout, one entry per line.
    async fn execute(
        &self,
        session: &Session<'_>,
        command: &str,
    ) -> Result<Vec<String>, ChannelError>;

    /// Copy one remote file to a local path. The remote file is left in place.
    ///
    /// `source` is the raw remote path; the transfer protects it from the
    /// remote shell.
    async fn pull(
        &self,
        session: &Session<'_>,
        source: &str,
        destination: &Path,
    ) -> Result<(), ChannelError>;
}

/// `ssh` for commands, `rsync` over `ssh` for transfers.
#[derive(Debug, Clone)]
pub struct SshChannel {
    command_timeout: Duration,
    transfer_timeout: Duration,
}

impl SshChannel {
    pub fn new(command_timeout: Duration, transfer_timeout: Duration) -> Self {
        Self {
            command_timeout,
            transfer_timeout,
        }
    }

    fn ssh_args(session: &Session<'_>, command: &str) -> Vec<String> {
        vec![
            "-i".to_string(),
            session.credential.key_path().to_string_lossy().into_owned(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            session.destination(),
            command.to_string(),
        ]
    }

    /// `--protect-args` hands the source path to the remote rsync verbatim,
    /// on rsync versions both before and after 3.2.4 made that the default.
    fn rsync_args(session: &Session<'_>, source: &str, destination: &Path) -> Vec<String> {
        let key = Linux.quote(&session.credential.key_path().to_string_lossy());
        vec![
            "-azv".to_string(),
            "--protect-args".to_string(),
            "-e".to_string(),
            format!("ssh -i {key} -o StrictHostKeyChecking=no -o BatchMode=yes"),
            format!("{}:{source}", session.destination()),
            destination.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl RemoteChannel for SshChannel {
    async fn execute(
        &self,
        session: &Session<'_>,
        command: &str,
    ) -> Result<Vec<String>, ChannelError> {
        debug!(server = session.server, user = session.user, %command, "ssh");
        let stdout = run("ssh", &Self::ssh_args(session, command), self.command_timeout).await?;
        Ok(stdout.lines().map(String::from).collect())
    }

    async fn pull(
        &self,
        session: &Session<'_>,
        source: &str,
        destination: &Path,
    ) -> Result<(), ChannelError> {
        debug!(
            server = session.server,
            user = session.user,
            source,
            destination = %destination.display(),
            "rsync"
        );
        let stdout = run(
            "rsync",
            &Self::rsync_args(session, source, destination),
            self.transfer_timeout,
        )
        .await?;
        debug!("{}", stdout.trim_end());
        Ok(())
    }
}

/// Run a local program, wait at most `limit`, and return its stdout.
///
/// The limit covers both the process and its output pipes. If the process
/// has exited by the deadline but a descendant still holds a pipe open, the
/// output read so far is used. Otherwise the child is killed.
async fn run(program: &str, args: &[String], limit: Duration) -> Result<String, ChannelError> {
    let transport = |source| ChannelError::Transport {
        program: program.to_string(),
        source,
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(transport)?;
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let finished = tokio::time::timeout(limit, async {
        let (_, _, status) = tokio::join!(
            drain(stdout_pipe, &mut stdout),
            drain(stderr_pipe, &mut stderr),
            child.wait(),
        );
        status
    })
    .await;

    let status: ExitStatus = match finished {
        Ok(status) => status.map_err(transport)?,
        Err(_) => match child.try_wait() {
            Ok(Some(status)) => status,
            _ => {
                let _ = child.kill().await;
                return Err(ChannelError::Timeout {
                    after: limit,
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                });
            }
        },
    };

    if status.success() {
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    } else {
        Err(ChannelError::Exit {
            code: status.code(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// Read a pipe to the end. Bytes read before a timeout stay in `buf`.
async fn drain(pipe: Option<impl AsyncRead + Unpin>, buf: &mut Vec<u8>) {
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(buf).await;
    }
}
