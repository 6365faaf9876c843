//! Version feed adapter.
//!
//! Normalizes one or more upstream "latest known-good version" feeds into
//! a single [`LatestVersionSet`] keyed by platform. Each configured feed
//! endpoint serves a JSON document describing the currently supported
//! release tracks for one platform; the adapter validates the document at
//! the boundary and never fabricates defaults when a feed is down.
//!
//! - [`VersionFeed`] — the seam the orchestrator depends on.
//! - [`HttpVersionFeed`] — reqwest-backed implementation.
//! - [`FeedError`] — unavailable vs. parse failure taxonomy.

pub mod client;
pub mod schema;

use async_trait::async_trait;
use stalewatch_core::LatestVersionSet;

pub use client::{FeedError, HttpVersionFeed};
pub use schema::{FeedDocument, FeedTrack};

/// Source of the canonical "current versions per platform" sets.
///
/// Fetched exactly once per run; the result is immutable for the run's
/// duration. An error here means the affected platforms cannot be
/// evaluated this run, which callers must treat as a global failure
/// rather than "no hosts are stale".
#[async_trait]
pub trait VersionFeed: Send + Sync {
    /// Fetch and merge every configured feed into one set.
    async fn fetch_latest(&self) -> Result<LatestVersionSet, FeedError>;
}
