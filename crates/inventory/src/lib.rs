//! Fleet inventory adapter.
//!
//! Retrieves the current observed OS version per host from the remote
//! query-reporting backend. One authenticated report fetch per run; the
//! backend's row order is not meaningful and not preserved.
//!
//! - [`FleetInventory`] — the seam the orchestrator depends on.
//! - [`HttpFleetInventory`] — reqwest-backed implementation against the
//!   backend's saved-query report endpoint.
//! - [`InventoryError`] / [`InventorySnapshot`] — failure taxonomy and
//!   the per-run result including the malformed-row count.

pub mod client;
pub mod schema;

use async_trait::async_trait;
use stalewatch_core::HostRecord;

pub use client::{HttpFleetInventory, InventoryError};
pub use schema::{ReportDocument, ReportRow};

/// Result of one inventory fetch.
///
/// `skipped_rows` counts report rows the adapter refused to turn into
/// [`HostRecord`]s (missing fields or unrecognized platform tokens); each
/// is logged with its reason. A record in `hosts` always has a non-empty
/// serial and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySnapshot {
    /// Hosts that reported in with a complete, well-formed row.
    pub hosts: Vec<HostRecord>,
    /// Rows dropped at the boundary with a diagnostic.
    pub skipped_rows: u32,
}

/// Source of per-host observed versions.
#[async_trait]
pub trait FleetInventory: Send + Sync {
    /// Fetch one report of every host that has checked in.
    async fn fetch_hosts(&self) -> Result<InventorySnapshot, InventoryError>;
}
