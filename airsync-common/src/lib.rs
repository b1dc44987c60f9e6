//! # AirSync Common Library
//!
//! Broadcast schedule synchronization core shared by the sync tooling:
//! - Sync window computation against a DST-observing civil timezone
//! - Time-boxed snapshots of remote playout state
//! - Civil-time conversion backed by the tz database
//! - Configuration loading
//! - Clock and identifier utilities

pub mod civil_time;
pub mod config;
pub mod error;
pub mod playout;
pub mod snapshot;
pub mod time;
pub mod uuid_utils;
pub mod window;

pub use civil_time::{CivilTime, TzdbCivilTime};
pub use error::{Error, Result};
pub use playout::PlayoutRecord;
pub use snapshot::{Snapshot, SnapshotStore, SNAPSHOT_TTL_MS};
pub use window::{compute_sync_window, compute_sync_window_in, SyncWindow, SyncWindowInput};
