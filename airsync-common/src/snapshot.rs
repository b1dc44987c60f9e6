//! Snapshot store
//!
//! Process-local, time-boxed record of what the remote scheduler reported for
//! a sync window. A later sync pass fetches the snapshot by id and diffs it
//! against current remote state.
//!
//! Expiry is checked on read: an entry older than the TTL is reported absent
//! whether or not it has been physically removed yet. Sweeping on write only
//! bounds memory and is never needed for correctness.
//!
//! Nothing survives a restart. Callers must treat a missing snapshot as "no
//! prior state" and fall back to a full sync.

use crate::playout::PlayoutRecord;
use crate::time::{format_utc_millis, Clock, SystemClock};
use crate::uuid_utils;
use crate::window::SyncWindow;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Snapshot time-to-live in milliseconds (24 hours)
pub const SNAPSHOT_TTL_MS: i64 = 86_400_000;

/// Snapshot time-to-live as a duration
pub fn default_ttl() -> Duration {
    Duration::milliseconds(SNAPSHOT_TTL_MS)
}

/// A sync window paired with the playouts retrieved for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Lookup key, generated on save
    pub id: String,
    pub window: SyncWindow,
    /// Playouts in caller-supplied order
    pub playouts: Vec<PlayoutRecord>,
    /// Save time; expiry is measured from here
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// First instant at which this snapshot is considered expired under `ttl`
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at + ttl
    }

    /// Expired once `now - created_at >= ttl`
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }
}

/// In-memory snapshot store
///
/// Construct one at process start and share it (e.g. behind an `Arc`) with
/// every sync routine. Readers receive clones; stored snapshots are never
/// handed out mutably.
pub struct SnapshotStore {
    /// Map of snapshot id -> snapshot
    entries: RwLock<HashMap<String, Snapshot>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SnapshotStore {
    /// Store on the wall clock with the 24-hour TTL
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, default_ttl())
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Save a window and its playouts under a freshly generated id
    ///
    /// Also drops any entries that have already expired.
    pub fn save_snapshot(&self, window: &SyncWindow, playouts: &[PlayoutRecord]) -> Snapshot {
        let now = self.clock.now();
        let snapshot = Snapshot {
            id: uuid_utils::generate_snapshot_id(),
            window: window.clone(),
            playouts: playouts.to_vec(),
            created_at: now,
        };

        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let removed = Self::sweep(&mut entries, now, self.ttl);
            entries.insert(snapshot.id.clone(), snapshot.clone());
            removed
        };

        if removed > 0 {
            info!("Swept {} expired sync snapshot(s)", removed);
        }
        debug!(
            "Saved sync snapshot {} ({} playouts, window {}, expires {})",
            snapshot.id,
            snapshot.playouts.len(),
            snapshot.window.weeks_label,
            format_utc_millis(snapshot.expires_at(self.ttl))
        );

        snapshot
    }

    /// Look up a snapshot; `None` if unknown or expired
    pub fn get_snapshot(&self, id: &str) -> Option<Snapshot> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        match entries.get(id) {
            Some(snapshot) if snapshot.is_expired_at(now, self.ttl) => {
                debug!("Sync snapshot {} expired at {}", id, format_utc_millis(snapshot.expires_at(self.ttl)));
                None
            }
            Some(snapshot) => Some(snapshot.clone()),
            None => {
                debug!("Sync snapshot {} not found", id);
                None
            }
        }
    }

    /// Physically remove expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            Self::sweep(&mut entries, now, self.ttl)
        };
        if removed > 0 {
            info!("Swept {} expired sync snapshot(s)", removed);
        }
        removed
    }

    /// Number of physically stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep(entries: &mut HashMap<String, Snapshot>, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = entries.len();
        entries.retain(|_, snapshot| !snapshot.is_expired_at(now, ttl));
        before - entries.len()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("entries", &self.len())
            .field("ttl_ms", &self.ttl.num_milliseconds())
            .finish()
    }
}
