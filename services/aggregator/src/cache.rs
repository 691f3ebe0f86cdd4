//! Snapshot cache
//!
//! Holds at most one built snapshot with its build instant. The lock is
//! held across the whole check → build → store sequence, so concurrent
//! cold reads trigger exactly one build and the rest wait for its
//! result instead of issuing redundant upstream traffic.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use types::snapshot::Snapshot;

use crate::error::BuildError;

struct CachedSnapshot {
    built_at: Instant,
    snapshot: Snapshot,
}

/// Single-slot time-to-live cache for the current snapshot.
///
/// Constructed once at startup and carried in application state; no
/// process-wide globals, no persistence across restarts.
pub struct SnapshotCache {
    ttl: Duration,
    slot: Mutex<Option<CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached snapshot if fresh, otherwise run `build` and
    /// store its result.
    ///
    /// Every returned snapshot — cache hit or fresh build — carries a
    /// current `served_at` stamp; `updated_at` only changes on a
    /// rebuild. A failed build propagates its error and leaves any
    /// previously cached entry untouched.
    pub async fn get_or_build<F, Fut>(&self, build: F) -> Result<Snapshot, BuildError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Snapshot, BuildError>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.built_at.elapsed() < self.ttl {
                debug!("serving cached snapshot");
                return Ok(restamp(cached.snapshot.clone()));
            }
        }

        let snapshot = build().await?;
        *slot = Some(CachedSnapshot {
            built_at: Instant::now(),
            snapshot: snapshot.clone(),
        });
        debug!("snapshot cache refreshed");

        Ok(snapshot)
    }
}

fn restamp(mut snapshot: Snapshot) -> Snapshot {
    snapshot.served_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    snapshot
}
