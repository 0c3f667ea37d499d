//! # scene_session
//!
//! Play-mode snapshot and restore.
//!
//! Entering play mode takes a full deep copy of the world
//! ([`SnapshotManager::backup`]); leaving it reverts every change the
//! simulation made ([`SnapshotManager::restore`]). The manager drives the
//! world exclusively through its public mutation API, so restoration is
//! observable on the event bus like any other edit.

pub mod snapshot;

pub use snapshot::{RestoreReport, SnapshotManager};
