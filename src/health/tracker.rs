//! Windowed connection-failure tracking.
//!
//! # Responsibilities
//! - Load, age and persist `ConnectionStats` per endpoint
//! - Serialize read-modify-write on a single endpoint's record
//!
//! # Design Decisions
//! - Records are overwritten, never merged
//! - Per-endpoint locks; different endpoints never contend

use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::clock::Timestamp;
use crate::health::types::ConnectionStats;
use crate::storage::{connection_stats_key, SessionStore};

/// Records and ages out connection failures per endpoint.
pub struct FailureTracker {
    store: Arc<dyn SessionStore>,
    window: Duration,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive access to one endpoint's record.
pub struct EndpointLock {
    lock: Arc<Mutex<()>>,
}

impl EndpointLock {
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FailureTracker {
    pub fn new(store: Arc<dyn SessionStore>, window: Duration) -> Self {
        Self {
            store,
            window,
            locks: DashMap::new(),
        }
    }

    /// Lock serializing updates to `uri`'s record.
    pub fn lock(&self, uri: &str) -> EndpointLock {
        let lock = self.locks.entry(uri.to_string()).or_default().clone();
        EndpointLock { lock }
    }

    /// Current record; absent or unreadable records are zero-valued.
    pub fn load(&self, uri: &str) -> ConnectionStats {
        let Some(raw) = self.store.get(&connection_stats_key(uri)) else {
            return ConnectionStats::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(endpoint = %uri, error = %e, "Discarding unreadable connection stats");
            ConnectionStats::default()
        })
    }

    /// Record that one more failure at `now` would produce. Not persisted.
    pub fn next_stats(&self, uri: &str, now: Timestamp) -> ConnectionStats {
        self.load(uri).next_failure(now, self.window)
    }

    pub fn persist(&self, uri: &str, stats: &ConnectionStats) {
        match serde_json::to_string(stats) {
            Ok(json) => self.store.set(&connection_stats_key(uri), json),
            Err(e) => tracing::error!(endpoint = %uri, error = %e, "Failed to encode connection stats"),
        }
    }

    /// Record a failure and persist the updated record.
    pub fn record_failure(&self, uri: &str, now: Timestamp) -> ConnectionStats {
        let lock = self.lock(uri);
        let _guard = lock.acquire();

        let stats = self.next_stats(uri, now);
        self.persist(uri, &stats);
        stats
    }
}
