//! Structured result of one pipeline pass.
//!
//! [`RunSummary`] is the single artifact a run leaves behind: counters for
//! every outcome class plus enough detail per failed host to diagnose
//! without re-running. The worker serializes it as JSON on stdout and
//! mirrors the counters into the log stream.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// HostFailure
// ---------------------------------------------------------------------------

/// Classification of a failure scoped to a single host.
///
/// These never abort the run; they are recorded and the pass continues
/// with the remaining hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostFailureKind {
    /// The directory resolved the device but no user is assigned to it.
    ContactNotFound,
    /// The directory lookup itself failed for this serial (transport or
    /// malformed response), as opposed to a clean "no user assigned".
    DirectoryLookupFailed,
    /// The contact's email has no account on the messaging platform and
    /// no fallback channel was configured.
    IdentityNotFound,
    /// The messaging platform rejected or failed the send.
    DeliveryFailed,
}

impl HostFailureKind {
    /// Stable token used in logs and the JSON summary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContactNotFound => "contact_not_found",
            Self::DirectoryLookupFailed => "directory_lookup_failed",
            Self::IdentityNotFound => "identity_not_found",
            Self::DeliveryFailed => "delivery_failed",
        }
    }
}

/// One failed host: which device, what kind of failure, and the
/// underlying message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostFailure {
    /// Serial of the host whose processing failed.
    pub hardware_serial: String,
    /// Failure classification.
    pub kind: HostFailureKind,
    /// Underlying error text for diagnosis.
    pub detail: String,
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Counters and failures accumulated over one full pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Unique id of this run, for correlating log lines.
    pub run_id: String,
    /// When the pass started (UTC).
    pub started_at: DateTime<Utc>,
    /// When the pass finished (UTC). Equal to `started_at` until
    /// [`finish`](Self::finish) is called.
    pub finished_at: DateTime<Utc>,
    /// Hosts that were evaluated against the current version sets.
    pub evaluated: u32,
    /// Hosts whose observed version is current.
    pub current: u32,
    /// Hosts whose observed version is stale.
    pub stale: u32,
    /// Stale hosts for which a reminder was actually delivered.
    pub notified: u32,
    /// Hosts skipped because their platform has no feed entry.
    pub unknown_platform: u32,
    /// Inventory rows dropped by the adapter before evaluation
    /// (missing fields or unrecognized platform strings).
    pub skipped_rows: u32,
    /// Per-host failures, in completion order.
    pub failures: Vec<HostFailure>,
}

impl RunSummary {
    /// Start a summary for a new run.
    pub fn begin(run_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id: run_id.into(),
            started_at: now,
            finished_at: now,
            evaluated: 0,
            current: 0,
            stale: 0,
            notified: 0,
            unknown_platform: 0,
            skipped_rows: 0,
            failures: Vec::new(),
        }
    }

    /// Record a per-host failure.
    pub fn record_failure(
        &mut self,
        hardware_serial: impl Into<String>,
        kind: HostFailureKind,
        detail: impl Into<String>,
    ) {
        self.failures.push(HostFailure {
            hardware_serial: hardware_serial.into(),
            kind,
            detail: detail.into(),
        });
    }

    /// True when at least one host failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Stamp the end time and return the finished summary.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_starts_at_zero() {
        let summary = RunSummary::begin("run-1");
        assert_eq!(summary.evaluated, 0);
        assert_eq!(summary.stale, 0);
        assert_eq!(summary.notified, 0);
        assert!(!summary.has_failures());
    }

    #[test]
    fn record_failure_keeps_serial_and_kind() {
        let mut summary = RunSummary::begin("run-2");
        summary.record_failure("SER123", HostFailureKind::ContactNotFound, "no assignee");

        assert!(summary.has_failures());
        let failure = &summary.failures[0];
        assert_eq!(failure.hardware_serial, "SER123");
        assert_eq!(failure.kind, HostFailureKind::ContactNotFound);
        assert_eq!(failure.detail, "no assignee");
    }

    #[test]
    fn finish_does_not_move_start() {
        let summary = RunSummary::begin("run-3");
        let started = summary.started_at;
        let finished = summary.finish();
        assert_eq!(finished.started_at, started);
        assert!(finished.finished_at >= started);
    }

    #[test]
    fn summary_serializes_with_snake_case_kinds() {
        let mut summary = RunSummary::begin("run-4");
        summary.record_failure("SER9", HostFailureKind::DeliveryFailed, "boom");

        let json = serde_json::to_value(&summary).expect("summary serializes");
        assert_eq!(json["run_id"], "run-4");
        assert_eq!(json["failures"][0]["kind"], "delivery_failed");
    }

    #[test]
    fn failure_kind_tokens_match_serde() {
        assert_eq!(HostFailureKind::IdentityNotFound.as_str(), "identity_not_found");
        assert_eq!(
            serde_json::to_value(HostFailureKind::IdentityNotFound).unwrap(),
            "identity_not_found"
        );
    }
}
