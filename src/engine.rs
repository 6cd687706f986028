//! Lifecycle orchestration: walk the inventory and run discover → filter →
//! act for every path entry.
//!
//! Failures are isolated at the smallest unit they affect. An unknown
//! server skips that server, a bad credential skips that user, a rejected
//! or failed listing empties that entry, a failed action marks that file.
//! Nothing below the top-level configuration aborts the run.
//!
//! Each server is one spawned task, and a semaphore bounds how many run at
//! once. Everything belonging to one server runs sequentially inside its
//! task, so two actions never target the same remote path at once and each
//! entry's results keep their listing order. The report is reassembled in
//! inventory order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use jiff::{Timestamp, civil::Date};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::act::{Executor, Target};
use crate::credentials::CredentialStore;
use crate::discover::discover;
use crate::eligibility::{self, Rules};
use crate::inventory::{Inventory, LogPathEntry, ServerRecord};
use crate::model::{Diagnostic, DiagnosticKind, Operation, Reason, RunReport, UnitReport};
use crate::platform::OsType;
use crate::remote::{RemoteChannel, Session};

/// Parameters of one run.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub operation: Operation,
    pub dry_run: bool,

    /// Captured once; every file in the run is judged against it.
    pub today: Date,
    pub threshold_days: u16,

    /// Servers processed in parallel. Zero is treated as one.
    pub workers: usize,
}

#[derive(Clone)]
pub struct Engine {
    channel: Arc<dyn RemoteChannel>,
    inventory: Arc<Inventory>,
    credentials: Arc<CredentialStore>,
    executor: Arc<dyn Executor>,
}

/// What one server contributed to the report.
#[derive(Default)]
struct ServerRun {
    units: Vec<UnitReport>,
    diagnostics: Vec<Diagnostic>,
}

/// Per-run state shared by every server task.
#[derive(Clone)]
struct Pass {
    plan: Plan,
    cutoff: Date,
    cancel: Arc<AtomicBool>,
}

impl Pass {
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

impl Engine {
    pub fn new(
        channel: Arc<dyn RemoteChannel>,
        inventory: Arc<Inventory>,
        credentials: Arc<CredentialStore>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            channel,
            inventory,
            credentials,
            executor,
        }
    }

    /// Run the plan over the whole inventory.
    ///
    /// Once `cancel` is set no new server or path entry is started; commands
    /// already in flight finish or time out on their own.
    pub async fn run(&self, plan: &Plan, cancel: &Arc<AtomicBool>) -> RunReport {
        let started_at = Timestamp::now();
        let pass = Pass {
            plan: *plan,
            cutoff: eligibility::cutoff(plan.today, plan.threshold_days),
            cancel: Arc::clone(cancel),
        };

        let semaphore = Arc::new(Semaphore::new(
            plan.workers.clamp(1, Semaphore::MAX_PERMITS),
        ));
        let mut handles = Vec::new();
        for (name, record) in self.inventory.servers() {
            let engine = self.clone();
            let pass = pass.clone();
            let semaphore = Arc::clone(&semaphore);
            let server = name.to_string();
            let record = record.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return ServerRun::cancelled(&server);
                };
                if pass.cancelled() {
                    ServerRun::cancelled(&server)
                } else {
                    engine.run_server(&server, &record, &pass).await
                }
            });
            handles.push((name.to_string(), handle));
        }

        let mut report = RunReport {
            operation: plan.operation,
            dry_run: plan.dry_run,
            started_at,
            today: plan.today,
            cutoff: pass.cutoff,
            units: Vec::new(),
            diagnostics: Vec::new(),
        };
        for (server, handle) in handles {
            match handle.await {
                Ok(run) => {
                    report.units.extend(run.units);
                    report.diagnostics.extend(run.diagnostics);
                }
                Err(e) => {
                    error!(server = %server, "worker stopped abnormally: {e}");
                    report.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::WorkerFailed,
                        &server,
                        format!("worker stopped abnormally: {e}"),
                    ));
                }
            }
        }
        report
    }

    async fn run_server(&self, server: &str, record: &ServerRecord, pass: &Pass) -> ServerRun {
        let mut run = ServerRun::default();

        let Some(os) = OsType::parse(&record.os) else {
            warn!(server, os = %record.os, "unsupported OS, skipping server");
            run.diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnsupportedOs,
                server,
                format!("unsupported OS '{}'", record.os),
            ));
            return run;
        };

        if !self.credentials.knows_server(server) {
            warn!(server, "no SSH keys for server, skipping");
            run.diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnknownServer,
                server,
                "no SSH keys configured for this server",
            ));
            return run;
        }

        let platform = os.platform();
        for (user, entries) in &record.users {
            let credential = match self.credentials.resolve(server, user) {
                Ok(credential) => credential,
                Err(e) => {
                    warn!(server, user = %user, "skipping user: {e}");
                    run.diagnostics.push(
                        Diagnostic::new(DiagnosticKind::Credential, server, e.to_string())
                            .user(user),
                    );
                    continue;
                }
            };
            let session = Session {
                server,
                user,
                credential: &credential,
            };

            for entry in entries {
                if pass.cancelled() {
                    let mut diagnostic =
                        Diagnostic::new(DiagnosticKind::Cancelled, server, "run interrupted")
                            .user(user);
                    if let Some(base_path) = entry.base_path() {
                        diagnostic = diagnostic.base_path(base_path);
                    }
                    run.diagnostics.push(diagnostic);
                    continue;
                }

                let Some(base_path) = entry.base_path() else {
                    warn!(server, user = %user, "path entry has no log_base_path, skipping");
                    run.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::InvalidEntry,
                            server,
                            "path entry has no log_base_path",
                        )
                        .user(user),
                    );
                    continue;
                };

                let rules = match Rules::new(&entry.include_patterns, &entry.exclude_patterns) {
                    Ok(rules) => rules,
                    Err(e) => {
                        warn!(server, user = %user, base_path, "skipping path entry: {e}");
                        run.diagnostics.push(
                            Diagnostic::new(DiagnosticKind::InvalidEntry, server, e.to_string())
                                .user(user)
                                .base_path(base_path),
                        );
                        continue;
                    }
                };

                let target = Target {
                    session,
                    platform,
                    base_path,
                };
                let unit = self
                    .run_entry(&target, entry, &rules, pass, &mut run.diagnostics)
                    .await;
                run.units.push(unit);
            }
        }

        run
    }

    async fn run_entry(
        &self,
        target: &Target<'_>,
        entry: &LogPathEntry,
        rules: &Rules,
        pass: &Pass,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> UnitReport {
        let Target {
            session,
            platform,
            base_path,
        } = *target;
        let (server, user) = (session.server, session.user);
        let operation = pass.plan.operation;

        info!(
            server,
            user,
            os = %platform.os(),
            base_path,
            "processing {operation}"
        );

        let files = match discover(
            self.channel.as_ref(),
            &session,
            platform,
            base_path,
            operation.listing(),
        )
        .await
        {
            Ok(files) => files,
            Err(e) => {
                warn!(server, user, base_path, "listing failed: {e}");
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::Discovery,
                        server,
                        format!("listing failed: {e}"),
                    )
                    .user(user)
                    .base_path(base_path),
                );
                Vec::new()
            }
        };
        let discovered = files.len();

        let decisions = eligibility::filter(files, rules, platform, pass.cutoff);

        for decision in decisions
            .iter()
            .filter(|d| d.reason == Reason::DateUnparseable)
        {
            warn!(
                server,
                user,
                "could not parse date from filename '{}', skipping",
                decision.file.filename
            );
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::DateUnparseable,
                    server,
                    format!("could not parse date from '{}'", decision.file.path),
                )
                .user(user)
                .base_path(base_path),
            );
        }

        let mut outcomes = Vec::new();
        for decision in decisions.iter().filter(|d| d.is_eligible()) {
            let outcome = self
                .executor
                .apply(
                    self.channel.as_ref(),
                    target,
                    &decision.file,
                    pass.plan.dry_run,
                )
                .await;
            outcomes.push(outcome);
        }

        if outcomes.is_empty() {
            info!(server, user, base_path, "no files to {operation}");
        }

        UnitReport {
            server: server.to_string(),
            user: user.to_string(),
            base_path: base_path.to_string(),
            log_folder: entry.log_folder.clone(),
            discovered,
            decisions,
            outcomes,
        }
    }
}

impl ServerRun {
    fn cancelled(server: &str) -> Self {
        Self {
            units: Vec::new(),
            diagnostics: vec![Diagnostic::new(
                DiagnosticKind::Cancelled,
                server,
                "run interrupted before this server started",
            )],
        }
    }
}
