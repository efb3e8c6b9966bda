//! Periodic refresh of the dashboard snapshot.

pub mod scheduler;
pub mod snapshot;
pub mod worker;

pub use scheduler::{PollerHandle, poll_once, spawn};
pub use snapshot::{DashboardSnapshot, SnapshotStore};
