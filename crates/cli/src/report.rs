// Final run summary output

use anyhow::{Context, Result};
use colored::Colorize;
use repo_transfer_core::domain::{FailureKind, RunSummary, TransferOutcome};
use tabled::{Table, Tabled};

const DETAIL_COLUMN_WIDTH: usize = 80;
const EXIT_FAILURES: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "#")]
    seq: usize,
    resource: String,
    kind: String,
    status: String,
    attempts: u32,
    worker: String,
    detail: String,
}

impl FailureRow {
    fn from_outcome(outcome: &TransferOutcome) -> Self {
        let kind = outcome
            .failure_kind()
            .map(|k| k.to_string())
            .unwrap_or_default();
        Self {
            seq: outcome.seq,
            resource: outcome.resource.clone(),
            kind: match outcome.failure_kind() {
                Some(FailureKind::Cancelled) => kind.yellow().to_string(),
                _ => kind.red().to_string(),
            },
            status: dash_or(outcome.status),
            attempts: outcome.attempts,
            worker: dash_or(outcome.worker_id),
            detail: shorten(outcome.detail().unwrap_or_default(), DETAIL_COLUMN_WIDTH),
        }
    }
}

fn dash_or<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn shorten(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

/// Print the summary to stdout, as JSON or as a colored table of failures
pub fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
        println!("{}", out);
        return Ok(());
    }

    println!();
    println!("{}", "--- Final Transfer Summary ---".cyan().bold());
    println!("  {} {}", "Run:".bold(), summary.run_id);
    println!("  {} {}", "Total repositories:".bold(), summary.total);
    println!(
        "  {} {}",
        "Successes:".bold(),
        summary.succeeded.to_string().green()
    );
    let failed = summary.failed.to_string();
    println!(
        "  {} {}",
        "Failures:".bold(),
        if summary.failed == 0 {
            failed.green()
        } else {
            failed.red()
        }
    );
    println!("  {} {} ms", "Duration:".bold(), summary.duration_ms());

    if summary.all_succeeded() {
        println!();
        println!("{}", "✓ All repositories transferred".green().bold());
        return Ok(());
    }

    let mut rows: Vec<FailureRow> = summary.failures().map(FailureRow::from_outcome).collect();
    rows.sort_by_key(|r| r.seq);
    println!();
    println!("{}", Table::new(rows));
    Ok(())
}

/// 130 when jobs were cancelled, 2 for failures under `--fail-on-error`, else 0
pub fn exit_status(summary: &RunSummary, fail_on_error: bool) -> u8 {
    if summary.cancelled() > 0 {
        EXIT_CANCELLED
    } else if fail_on_error && !summary.all_succeeded() {
        EXIT_FAILURES
    } else {
        0
    }
}
