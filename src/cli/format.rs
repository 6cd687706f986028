//! Output formatting for CLI display.

use std::fmt::Write;

use crate::model::{OutcomeStatus, Reason, RunReport};

/// Human-readable run summary: counts first, then every problem.
pub(super) fn summary(report: &RunReport) -> String {
    let mut out = String::new();
    let mode = if report.dry_run { " (dry run)" } else { "" };

    let _ = writeln!(
        out,
        "{}{mode}: {} path entries, cutoff {} (today {})",
        report.operation,
        report.units.len(),
        report.cutoff,
        report.today
    );

    let files: usize = report.units.iter().map(|u| u.discovered).sum();
    let _ = writeln!(out, "  discovered: {files}");
    for reason in Reason::ALL {
        let count = report.count_reason(reason);
        if count > 0 {
            let _ = writeln!(out, "  {reason}: {count}");
        }
    }
    for status in OutcomeStatus::ALL {
        let count = report.count_status(status);
        if count > 0 {
            let _ = writeln!(out, "  {status}: {count}");
        }
    }

    let problems: Vec<_> = report
        .units
        .iter()
        .flat_map(|u| u.outcomes.iter().map(move |o| (u, o)))
        .filter(|(_, o)| !o.succeeded())
        .collect();
    if !problems.is_empty() {
        out.push_str("\nNeeds attention:\n");
        for (unit, outcome) in problems {
            let _ = writeln!(
                out,
                "  [{}] {}@{} {}: {}",
                outcome.status, unit.user, unit.server, outcome.path, outcome.detail
            );
        }
    }

    if !report.diagnostics.is_empty() {
        out.push_str("\nDiagnostics:\n");
        for d in &report.diagnostics {
            let who = match &d.user {
                Some(user) => format!("{user}@{}", d.server),
                None => d.server.clone(),
            };
            let at = d
                .base_path
                .as_deref()
                .map(|p| format!(" {p}"))
                .unwrap_or_default();
            let _ = writeln!(out, "  [{}] {who}{at}: {}", d.kind, d.message);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use jiff::civil::date;

    use crate::model::{
        ActionOutcome, Diagnostic, DiagnosticKind, DiscoveredFile, EligibilityDecision, Operation,
        UnitReport,
    };
    use crate::platform::Linux;

    fn decision(path: &str, reason: Reason) -> EligibilityDecision {
        EligibilityDecision {
            file: DiscoveredFile::new(path, &Linux),
            reason,
            date: None,
        }
    }

    fn report(dry_run: bool) -> RunReport {
        RunReport {
            operation: Operation::Delete,
            dry_run,
            started_at: Timestamp::UNIX_EPOCH,
            today: date(2024, 2, 1),
            cutoff: date(2024, 1, 17),
            units: vec![UnitReport {
                server: "web01".into(),
                user: "svc".into(),
                base_path: "/var/log/app".into(),
                log_folder: "app".into(),
                discovered: 3,
                decisions: vec![
                    decision("/var/log/app/a.2024-01-01.log", Reason::Eligible),
                    decision("/var/log/app/b.2024-01-02.log", Reason::Eligible),
                    decision("/var/log/app/syslog", Reason::DateUnparseable),
                ],
                outcomes: vec![
                    ActionOutcome::applied("/var/log/app/a.2024-01-01.log", "deleted"),
                    ActionOutcome::failed(
                        "/var/log/app/b.2024-01-02.log",
                        "delete failed: Permission denied",
                    ),
                ],
            }],
            diagnostics: vec![
                Diagnostic::new(DiagnosticKind::UnknownServer, "db01", "no SSH keys"),
                Diagnostic::new(DiagnosticKind::DateUnparseable, "web01", "no date in 'syslog'")
                    .user("svc")
                    .base_path("/var/log/app"),
            ],
        }
    }

    #[test]
    fn lists_failures_and_diagnostics() {
        let text = summary(&report(false));

        assert!(text.starts_with("delete: 1 path entries, cutoff 2024-01-17 (today 2024-02-01)"));
        assert!(text.contains("  discovered: 3\n"));
        assert!(text.contains(&format!("  {}: 2\n", Reason::Eligible)));
        assert!(text.contains(&format!("  {}: 1\n", OutcomeStatus::Failed)));
        assert!(text.contains(
            "svc@web01 /var/log/app/b.2024-01-02.log: delete failed: Permission denied"
        ));
        assert!(!text.contains("a.2024-01-01.log: deleted"));
        assert!(text.contains("db01: no SSH keys"));
        assert!(text.contains("svc@web01 /var/log/app: no date in 'syslog'"));
    }

    #[test]
    fn dry_run_is_labelled() {
        let mut r = report(true);
        r.units[0].outcomes.clear();
        r.diagnostics.clear();
        let text = summary(&r);

        assert!(text.starts_with("delete (dry run):"));
        assert!(!text.contains("Needs attention"));
        assert!(!text.contains("Diagnostics"));
    }
}
