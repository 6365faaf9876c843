//! Run orchestrator for the staleness pipeline.
//!
//! One invocation performs one full pass: fetch the current version
//! sets, fetch the fleet inventory, evaluate every host, and resolve and
//! notify the owner of every stale host. The pass holds no state beyond
//! its own [`RunSummary`](stalewatch_core::RunSummary) and leaves
//! nothing behind for the next invocation.

pub mod config;
pub mod run;

pub use config::{ConfigError, WorkerConfig};
pub use run::{run_once, run_with_budget, RunError, RunOptions};
