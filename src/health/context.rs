//! Shared health state for one reactor instance.
//!
//! Owns the session store, catalog, clock, failure tracker, blocklist and
//! retry guard. Constructed once and shared via `Arc` by the checker and
//! selector; independent instances do not see each other's state.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::HealthCheckConfig;
use crate::health::blocklist::{BlockOutcome, BlocklistRegistry};
use crate::health::tracker::FailureTracker;
use crate::health::types::ConnectionStats;
use crate::network::{NetworkCatalog, NetworkId};
use crate::storage::{connection_stats_key, SessionStore, RETRY_KEY};

/// What happened to an endpoint after a failed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Below the threshold (or network unknown): stats persisted.
    Tracked(ConnectionStats),
    /// Threshold reached: endpoint sent to the blocklist.
    Blocked(BlockOutcome),
}

pub struct EndpointHealthContext {
    catalog: Arc<NetworkCatalog>,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    settings: HealthCheckConfig,
    tracker: FailureTracker,
    blocklist: BlocklistRegistry,
    retry_guard: Mutex<()>,
}

impl EndpointHealthContext {
    pub fn new(
        catalog: Arc<NetworkCatalog>,
        store: Arc<dyn SessionStore>,
        settings: HealthCheckConfig,
    ) -> Self {
        Self::with_clock(catalog, store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        catalog: Arc<NetworkCatalog>,
        store: Arc<dyn SessionStore>,
        settings: HealthCheckConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let window = Duration::from_secs(settings.failure_window_secs);
        Self {
            tracker: FailureTracker::new(store.clone(), window),
            blocklist: BlocklistRegistry::new(store.clone()),
            catalog,
            store,
            clock,
            settings,
            retry_guard: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &NetworkCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &HealthCheckConfig {
        &self.settings
    }

    pub fn tracker(&self) -> &FailureTracker {
        &self.tracker
    }

    pub fn blocklist(&self) -> &BlocklistRegistry {
        &self.blocklist
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_secs)
    }

    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Record a failed probe and apply the blocking threshold.
    ///
    /// The endpoint's record is locked for the whole read-modify-write,
    /// including the block that deletes it.
    pub fn report_failure(&self, uri: &str, network_id: NetworkId) -> FailureDisposition {
        let lock = self.tracker.lock(uri);
        let _guard = lock.acquire();

        let now = self.now();
        let stats = self.tracker.next_stats(uri, now);

        match self.catalog.lookup(network_id) {
            Some(network) if stats.failed_connection_count >= self.settings.max_failed_connections => {
                FailureDisposition::Blocked(self.blocklist.block(uri, network, now))
            }
            _ => {
                self.tracker.persist(uri, &stats);
                tracing::debug!(
                    endpoint = %uri,
                    network = %network_id,
                    failures = stats.failed_connection_count,
                    "Connection failure recorded"
                );
                FailureDisposition::Tracked(stats)
            }
        }
    }

    /// True exactly once per session.
    pub fn retry_on_invalid(&self) -> bool {
        let _guard = self.retry_guard.lock().unwrap_or_else(PoisonError::into_inner);
        if self.store.get(RETRY_KEY).is_some() {
            return false;
        }
        self.store.set(RETRY_KEY, "true".to_string());
        true
    }

    /// Start a fresh session: empty the blocklist, re-arm the retry guard
    /// and drop failure records for every catalogued endpoint.
    ///
    /// Returns the number of blocklist entries cleared.
    pub fn reset_session(&self) -> usize {
        let _guard = self.retry_guard.lock().unwrap_or_else(PoisonError::into_inner);

        let cleared = self.blocklist.len();
        self.blocklist.clear();
        self.store.delete(RETRY_KEY);

        for id in self.catalog.ids() {
            let Some(network) = self.catalog.lookup(id) else {
                continue;
            };
            for uri in network.primary_uris().iter().chain(network.fallback_uris()) {
                let lock = self.tracker.lock(uri);
                let _record = lock.acquire();
                self.store.delete(&connection_stats_key(uri));
            }
        }

        tracing::info!(cleared, "Session reset");
        cleared
    }
}
