//! Stalewatch domain core.
//!
//! This crate provides the shared building blocks for the staleness
//! pipeline and has no internal dependencies:
//!
//! - [`Platform`], [`HostRecord`], [`LatestVersionSet`] — the fleet
//!   inventory and version-feed domain model.
//! - [`Contact`], [`NotificationEvent`] — the per-host notification
//!   envelope handed to delivery.
//! - [`evaluate`] / [`Freshness`] — the exact-membership staleness rule.
//! - [`RunSummary`] — the structured result of a single pipeline pass.

pub mod staleness;
pub mod summary;
pub mod types;

pub use staleness::{evaluate, Freshness};
pub use summary::{HostFailure, HostFailureKind, RunSummary};
pub use types::{Contact, HostRecord, LatestVersionSet, NotificationEvent, Platform};
