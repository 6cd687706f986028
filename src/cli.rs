//! CLI interface for logsweep.
//!
//! Each subcommand runs one lifecycle operation over every server in the
//! inventory:
//!
//! - `logsweep archive` pulls old compressed logs into the local mirror.
//! - `logsweep compress` compresses old uncompressed logs in place.
//! - `logsweep delete` removes old logs.
//!
//! A summary always goes to stdout. `--out` also writes the full report as
//! JSON. Per-server failures never change the exit status; only a run that
//! could not start exits non-zero.

mod format;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use crate::act;
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::engine::{Engine, Plan};
use crate::inventory::Inventory;
use crate::model::{Operation, RunReport};
use crate::remote::SshChannel;

/// Logsweep: archive, compress, and delete aging logs on remote servers.
#[derive(Debug, Parser)]
#[command(name = "logsweep", version, after_long_help = USAGE_HELP)]
pub struct Cli {
    /// Settings file (default: `~/.logsweep/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server inventory JSON. Overrides the settings file.
    #[arg(long, global = true)]
    inventory: Option<PathBuf>,

    /// Credential store JSON. Overrides the settings file.
    #[arg(long, global = true)]
    keys: Option<PathBuf>,

    /// Servers processed in parallel. Overrides the settings file.
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    workers: Option<u16>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const USAGE_HELP: &str = r"Typical use:
  logsweep compress --dry-run         review what would be compressed
  logsweep compress --execute         compress files older than 5 days
  logsweep archive --out report.json  pull compressed files older than 7 days
  logsweep delete --dry-run           review what would be deleted

Age comes from the date in the filename, never from file timestamps.
Files whose names carry no date are reported and left alone.";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pull compressed logs into the local archive mirror.
    ///
    /// Remote originals are left in place.
    Archive {
        /// Report what would be pulled without transferring anything.
        #[arg(long)]
        dry_run: bool,

        /// Local archive root. Overrides the settings file.
        #[arg(long)]
        archive_root: Option<PathBuf>,

        /// Write the run report JSON to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compress uncompressed logs in place.
    ///
    /// Requires an explicit `--dry-run` or `--execute`.
    Compress {
        #[command(flatten)]
        mode: CompressMode,

        /// Write the run report JSON to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Delete old logs.
    Delete {
        /// Report what would be deleted without removing anything.
        #[arg(long)]
        dry_run: bool,

        /// Write the run report JSON to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct CompressMode {
    /// Report what would be compressed without changing anything.
    #[arg(long)]
    dry_run: bool,

    /// Compress for real.
    #[arg(long)]
    execute: bool,
}

impl Command {
    fn operation(&self) -> Operation {
        match self {
            Self::Archive { .. } => Operation::Archive,
            Self::Compress { .. } => Operation::Compress,
            Self::Delete { .. } => Operation::Delete,
        }
    }

    fn dry_run(&self) -> bool {
        match self {
            Self::Archive { dry_run, .. } | Self::Delete { dry_run, .. } => *dry_run,
            Self::Compress { mode, .. } => mode.dry_run,
        }
    }

    fn out(&self) -> Option<&Path> {
        match self {
            Self::Archive { out, .. } | Self::Compress { out, .. } | Self::Delete { out, .. } => {
                out.as_deref()
            }
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub async fn run(cli: &Cli) -> Result<(), String> {
    let config = resolve_config(cli)?;
    let operation = cli.command.operation();
    let dry_run = cli.command.dry_run();

    let inventory = Inventory::load(&config.inventory)
        .map_err(|e| format!("failed to load inventory: {e}"))?;
    let credentials = CredentialStore::load(&config.keys)
        .map_err(|e| format!("failed to load SSH keys: {e}"))?;

    if inventory.is_empty() {
        warn!(path = %config.inventory.display(), "no servers in inventory, nothing to do");
        return Ok(());
    }
    if credentials.is_empty() {
        warn!(path = %config.keys.display(), "no SSH keys configured, nothing to do");
        return Ok(());
    }

    let executor = act::executor(operation, &config.archive_root);
    let channel = Arc::new(SshChannel::new(
        Duration::from_secs(config.command_timeout_secs),
        Duration::from_secs(config.transfer_timeout_secs),
    ));
    let cancel = install_cancel_handler();

    let plan = Plan {
        operation,
        dry_run,
        today: jiff::Zoned::now().date(),
        threshold_days: config.thresholds.days(operation),
        workers: config.workers,
    };

    info!(
        operation = %executor.operation(),
        dry_run,
        threshold_days = plan.threshold_days,
        workers = plan.workers,
        "starting run"
    );

    let report = Engine::new(channel, Arc::new(inventory), Arc::new(credentials), executor)
        .run(&plan, &cancel)
        .await;

    print!("{}", format::summary(&report));

    if let Some(path) = cli.command.out() {
        write_report(&report, path)?;
        eprintln!("Report written to {}", path.display());
    }

    Ok(())
}

/// Load the settings file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config, String> {
    let mut config = Config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;

    if let Some(path) = &cli.inventory {
        config.inventory.clone_from(path);
    }
    if let Some(path) = &cli.keys {
        config.keys.clone_from(path);
    }
    if let Some(workers) = cli.workers {
        config.workers = usize::from(workers);
    }
    if let Command::Archive {
        archive_root: Some(root),
        ..
    } = &cli.command
    {
        config.archive_root.clone_from(root);
    }

    Ok(config)
}

/// First Ctrl+C stops new work; a second one exits immediately.
fn install_cancel_handler() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);

    let result = ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            process::exit(130);
        }
        eprintln!("Interrupted: finishing commands in flight, press Ctrl+C again to abort");
    });
    if let Err(e) = result {
        warn!("could not install Ctrl+C handler: {e}");
    }

    cancel
}

fn write_report(report: &RunReport, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| format!("failed to serialize report: {e}"))?;
    fs::write(path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compress_requires_a_mode() {
        assert!(Cli::try_parse_from(["logsweep", "compress"]).is_err());
        assert!(Cli::try_parse_from(["logsweep", "compress", "--dry-run", "--execute"]).is_err());

        let cli = Cli::try_parse_from(["logsweep", "compress", "--execute"]).unwrap();
        assert!(!cli.command.dry_run());
        let cli = Cli::try_parse_from(["logsweep", "compress", "--dry-run"]).unwrap();
        assert!(cli.command.dry_run());
    }

    #[test]
    fn archive_and_delete_execute_by_default() {
        let cli = Cli::try_parse_from(["logsweep", "delete"]).unwrap();
        assert_eq!(cli.command.operation(), Operation::Delete);
        assert!(!cli.command.dry_run());

        let cli = Cli::try_parse_from(["logsweep", "archive", "--dry-run"]).unwrap();
        assert_eq!(cli.command.operation(), Operation::Archive);
        assert!(cli.command.dry_run());
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(Cli::try_parse_from(["logsweep", "--workers", "0", "delete"]).is_err());
    }

    #[test]
    fn flags_override_settings_file() {
        let dir = TempDir::new().unwrap();
        let settings = dir.path().join("config.toml");
        fs::write(&settings, "workers = 2\narchive-root = \"/srv/a\"\n").unwrap();
        let settings = settings.to_str().unwrap();

        let cli = Cli::try_parse_from([
            "logsweep",
            "--config",
            settings,
            "--keys",
            "/etc/keys.json",
            "--workers",
            "8",
            "archive",
            "--archive-root",
            "/srv/b",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.workers, 8);
        assert_eq!(config.keys, PathBuf::from("/etc/keys.json"));
        assert_eq!(config.archive_root, PathBuf::from("/srv/b"));
        assert_eq!(config.inventory, PathBuf::from("inventory.json"));
    }

    #[tokio::test]
    async fn missing_inventory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("inventory.json");
        let cli = Cli::try_parse_from([
            "logsweep",
            "--config",
            dir.path().join("absent.toml").to_str().unwrap(),
            "--inventory",
            missing.to_str().unwrap(),
            "delete",
        ])
        .unwrap();

        // The named settings file is missing too; that is reported first.
        let err = run(&cli).await.unwrap_err();
        assert!(err.contains("not found"), "{err}");
    }

    #[tokio::test]
    async fn empty_inventory_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        let settings = dir.path().join("config.toml");
        fs::write(&settings, "").unwrap();
        let inventory = dir.path().join("inventory.json");
        fs::write(&inventory, "{}").unwrap();
        let keys = dir.path().join("keys.json");
        fs::write(&keys, r#"{"web01": {"users": {"svc": "/nonexistent"}}}"#).unwrap();

        let cli = Cli::try_parse_from([
            "logsweep",
            "--config",
            settings.to_str().unwrap(),
            "--inventory",
            inventory.to_str().unwrap(),
            "--keys",
            keys.to_str().unwrap(),
            "delete",
        ])
        .unwrap();

        assert!(run(&cli).await.is_ok());
    }
}
