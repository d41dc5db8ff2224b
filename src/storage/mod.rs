//! Session persistence subsystem.
//!
//! # Data Flow
//! ```text
//! FailureTracker   → "-Reactor:<uri>" (ConnectionStats JSON)
//! BlocklistRegistry → "invalidNodes"  (URI → blocked-at JSON map)
//! Retry guard      → "-Reactor:retry" (presence marker)
//!     → SessionStore (memory.rs or file.rs)
//! ```
//!
//! # Design Decisions
//! - Narrow synchronous get/set/delete interface, string values
//! - Session lifetime only; stale blocklists must not outlive the session
//! - Stores never fail callers: write errors are logged

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the persisted blocklist map.
pub const BLOCKLIST_KEY: &str = "invalidNodes";

/// Key holding the retry-once marker.
pub const RETRY_KEY: &str = "-Reactor:retry";

const STATS_PREFIX: &str = "-Reactor:";

/// Key-value store with at-least session-lifetime durability.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn delete(&self, key: &str);
}

/// Storage key for an endpoint's connection stats.
pub fn connection_stats_key(uri: &str) -> String {
    format!("{STATS_PREFIX}{uri}")
}
