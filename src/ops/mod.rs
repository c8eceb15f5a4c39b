//! High-level operations.
//!
//! This module contains the implementation of bush commands.

pub mod bush_link;
pub mod bush_sync;
pub mod gap_fill;
pub mod materialize;
pub mod plan;

pub use bush_link::{link, matching_packages, LinkOptions, LinkedPackage};
pub use bush_sync::{sync, SyncOptions, SyncSummary};
pub use gap_fill::record_gap;
pub use materialize::{materialize, package_dependencies, Outcome};
pub use plan::{Step, SyncPlan};
