//! The single-pass pipeline.
//!
//! [`run_once`] composes the adapters in sequence: version feeds and
//! inventory are global dependencies whose failure aborts the pass,
//! while everything downstream of the per-host fan-out is isolated so
//! one host's bad luck never silences reminders for the rest of the
//! fleet. [`run_with_budget`] adds the overall wall-clock bound.

use std::time::Duration;

use futures::StreamExt;
use stalewatch_core::{
    evaluate, Freshness, HostFailureKind, HostRecord, LatestVersionSet, NotificationEvent,
    RunSummary,
};
use stalewatch_directory::{DeviceDirectory, DirectoryError, DirectoryToken};
use stalewatch_feeds::{FeedError, VersionFeed};
use stalewatch_inventory::{FleetInventory, InventoryError};
use stalewatch_notify::{render_reminder, Notifier, NotifyError};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// A failure in a shared upstream dependency. Any of these aborts the
/// pass with a non-zero exit status; no meaningful partial evaluation is
/// possible without the dependency.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A version feed was unreachable or unparseable.
    #[error("version feed failure: {0}")]
    Feed(#[from] FeedError),

    /// The inventory backend was unreachable or unparseable.
    #[error("inventory failure: {0}")]
    Inventory(#[from] InventoryError),

    /// Directory token acquisition failed; no contact can be resolved.
    #[error("directory auth failure: {0}")]
    DirectoryAuth(DirectoryError),

    /// The pass exceeded its wall-clock budget and was abandoned.
    #[error("run exceeded its {budget_secs}s wall-clock budget")]
    Timeout {
        /// The budget that was exceeded, in seconds.
        budget_secs: u64,
    },
}

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

/// Per-run knobs that are not external dependencies.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Correlation id stamped into the summary and every log line.
    pub run_id: String,
    /// Bound on concurrent per-host resolution/notification.
    pub max_concurrent_hosts: usize,
}

// ---------------------------------------------------------------------------
// run_once
// ---------------------------------------------------------------------------

/// Execute one full pass and return its summary.
///
/// Per-host failures are recorded in the summary and do not affect the
/// return value; only global dependency failures produce an `Err`.
pub async fn run_once<F, I, D, N>(
    feed: &F,
    inventory: &I,
    directory: &D,
    notifier: &N,
    opts: &RunOptions,
) -> Result<RunSummary, RunError>
where
    F: VersionFeed,
    I: FleetInventory,
    D: DeviceDirectory,
    N: Notifier,
{
    let mut summary = RunSummary::begin(opts.run_id.clone());
    tracing::info!(run_id = %summary.run_id, "Starting staleness pass");

    let latest = feed.fetch_latest().await?;
    let snapshot = inventory.fetch_hosts().await?;
    summary.skipped_rows = snapshot.skipped_rows;

    // One token for the whole fan-out; lookups share it read-only.
    let token = directory
        .acquire_token()
        .await
        .map_err(RunError::DirectoryAuth)?;

    let stale_hosts = triage(&mut summary, &snapshot.hosts, &latest);

    let outcomes = futures::stream::iter(stale_hosts.into_iter().map(|host| {
        let token = &token;
        async move {
            let result = process_stale_host(directory, notifier, token, &host).await;
            (host, result)
        }
    }))
    .buffer_unordered(opts.max_concurrent_hosts.max(1))
    .collect::<Vec<_>>()
    .await;

    for (host, result) in outcomes {
        match result {
            Ok(()) => summary.notified += 1,
            Err((kind, detail)) => {
                tracing::warn!(
                    run_id = %summary.run_id,
                    hardware_serial = %host.hardware_serial,
                    kind = kind.as_str(),
                    detail = %detail,
                    "Host processing failed"
                );
                summary.record_failure(host.hardware_serial, kind, detail);
            }
        }
    }

    let summary = summary.finish();
    tracing::info!(
        run_id = %summary.run_id,
        evaluated = summary.evaluated,
        current = summary.current,
        stale = summary.stale,
        notified = summary.notified,
        unknown_platform = summary.unknown_platform,
        skipped_rows = summary.skipped_rows,
        failures = summary.failures.len(),
        "Staleness pass complete"
    );
    Ok(summary)
}

/// Execute one pass under a wall-clock budget.
///
/// The pipeline must finish inside `budget` or the pass is abandoned
/// with [`RunError::Timeout`] rather than hanging into the scheduler's
/// next tick.
pub async fn run_with_budget<F, I, D, N>(
    feed: &F,
    inventory: &I,
    directory: &D,
    notifier: &N,
    opts: &RunOptions,
    budget: Duration,
) -> Result<RunSummary, RunError>
where
    F: VersionFeed,
    I: FleetInventory,
    D: DeviceDirectory,
    N: Notifier,
{
    match tokio::time::timeout(budget, run_once(feed, inventory, directory, notifier, opts)).await
    {
        Ok(result) => result,
        Err(_) => Err(RunError::Timeout {
            budget_secs: budget.as_secs(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Per-host processing
// ---------------------------------------------------------------------------

/// Evaluate every host, updating the counters, and return the stale ones.
fn triage(
    summary: &mut RunSummary,
    hosts: &[HostRecord],
    latest: &LatestVersionSet,
) -> Vec<HostRecord> {
    let mut stale_hosts = Vec::new();

    for host in hosts {
        summary.evaluated += 1;
        match evaluate(&host.observed_version, host.platform, latest) {
            Freshness::Current => summary.current += 1,
            Freshness::Stale => {
                summary.stale += 1;
                stale_hosts.push(host.clone());
            }
            Freshness::Indeterminate => {
                summary.unknown_platform += 1;
                tracing::warn!(
                    hardware_serial = %host.hardware_serial,
                    platform = %host.platform,
                    "No current-version entry for platform, skipping host"
                );
            }
        }
    }

    stale_hosts
}

/// Resolve and notify one stale host, mapping every failure to its
/// summary classification.
async fn process_stale_host<D, N>(
    directory: &D,
    notifier: &N,
    token: &DirectoryToken,
    host: &HostRecord,
) -> Result<(), (HostFailureKind, String)>
where
    D: DeviceDirectory,
    N: Notifier,
{
    let contact = directory
        .resolve_contact(token, &host.hardware_serial)
        .await
        .map_err(|e| match e {
            DirectoryError::ContactNotFound { .. } => {
                (HostFailureKind::ContactNotFound, e.to_string())
            }
            other => (HostFailureKind::DirectoryLookupFailed, other.to_string()),
        })?;

    let body = render_reminder(host.platform, &host.observed_version);
    let event = NotificationEvent::new(contact, host, body);

    notifier.deliver(&event).await.map_err(|e| match e {
        NotifyError::IdentityNotFound { .. } => (HostFailureKind::IdentityNotFound, e.to_string()),
        other => (HostFailureKind::DeliveryFailed, other.to_string()),
    })
}
