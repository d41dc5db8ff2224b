//! Persisted endpoint blocklist with a failsafe reset.
//!
//! # State Transitions
//! ```text
//! Healthy → Blocked: failure count reaches the threshold
//! Blocked → Healthy: failsafe reset (all entries at once) or manual clear
//! ```
//!
//! # Design Decisions
//! - The whole map is persisted on every change under `invalidNodes`
//! - Block and failsafe evaluation happen under one lock, so a block can
//!   neither be lost mid-reset nor trigger a second reset

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::Timestamp;
use crate::network::NetworkConfig;
use crate::observability::metrics;
use crate::storage::{connection_stats_key, SessionStore, BLOCKLIST_KEY};

/// What a `block` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Endpoint was added.
    Blocked,
    /// Endpoint was already on the list.
    AlreadyBlocked,
    /// Endpoint was added, which tripped the failsafe and emptied the list.
    BlockedThenReset,
}

/// Endpoints currently excluded from selection, keyed by URI with the
/// timestamp they were blocked at.
pub struct BlocklistRegistry {
    store: Arc<dyn SessionStore>,
    entries: Mutex<BTreeMap<String, Timestamp>>,
}

impl BlocklistRegistry {
    /// Load the registry from the session store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let entries: BTreeMap<String, Timestamp> = store
            .get(BLOCKLIST_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(map) => Some(map),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable blocklist");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Timestamp>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_blocked(&self, uri: &str) -> bool {
        self.entries().contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Blocked URIs with their blocked-at timestamps.
    pub fn snapshot(&self) -> BTreeMap<String, Timestamp> {
        self.entries().clone()
    }

    /// Block `uri`, drop its connection stats and evaluate the failsafe.
    pub fn block(&self, uri: &str, network: &NetworkConfig, now: Timestamp) -> BlockOutcome {
        let mut entries = self.entries();

        let outcome = if entries.contains_key(uri) {
            BlockOutcome::AlreadyBlocked
        } else {
            entries.insert(uri.to_string(), now);
            self.persist(&entries);
            self.store.delete(&connection_stats_key(uri));

            tracing::warn!(
                endpoint = %uri,
                network = network.network_id,
                blocked = entries.len(),
                "Endpoint blocked"
            );
            metrics::record_endpoint_blocked(network.network_id);
            BlockOutcome::Blocked
        };

        if Self::failsafe_reset_locked(&self.store, &mut entries, network)
            && outcome == BlockOutcome::Blocked
        {
            return BlockOutcome::BlockedThenReset;
        }
        outcome
    }

    /// Clear the list if every primary endpoint is blocked and there is no
    /// fallback tier. Returns true if the list was cleared.
    pub fn maybe_failsafe_reset(&self, network: &NetworkConfig) -> bool {
        let mut entries = self.entries();
        Self::failsafe_reset_locked(&self.store, &mut entries, network)
    }

    fn failsafe_reset_locked(
        store: &Arc<dyn SessionStore>,
        entries: &mut BTreeMap<String, Timestamp>,
        network: &NetworkConfig,
    ) -> bool {
        if !network.fallback_uris().is_empty() || network.primary_uris().is_empty() {
            return false;
        }

        // Duplicated primaries share one entry
        let primary: BTreeSet<&str> = network.primary_uris().iter().map(String::as_str).collect();
        let blocked_primaries = entries
            .keys()
            .filter(|uri| primary.contains(uri.as_str()))
            .count();
        if blocked_primaries != primary.len() {
            return false;
        }

        let cleared = entries.len();
        entries.clear();
        store.delete(BLOCKLIST_KEY);

        tracing::warn!(
            network = network.network_id,
            cleared,
            "Every primary endpoint blocked and no fallback; blocklist reset"
        );
        metrics::record_failsafe_reset(network.network_id);
        metrics::record_blocklist_size(0);
        true
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut entries = self.entries();
        entries.clear();
        self.store.delete(BLOCKLIST_KEY);
        metrics::record_blocklist_size(0);
    }

    fn persist(&self, entries: &BTreeMap<String, Timestamp>) {
        match serde_json::to_string(entries) {
            Ok(json) => self.store.set(BLOCKLIST_KEY, json),
            Err(e) => tracing::error!(error = %e, "Failed to encode blocklist"),
        }
        metrics::record_blocklist_size(entries.len());
    }
}
