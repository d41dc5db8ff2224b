//! Endpoint health subsystem.
//!
//! # Data Flow
//! ```text
//! checker.rs (net_peerCount → eth_syncing, per-probe timeout)
//!     → Alive(uri): nothing recorded
//!     → Failed: context.rs report_failure
//!         → tracker.rs (windowed failure count, per-endpoint lock)
//!         → count >= threshold: blocklist.rs block
//!             → all primaries blocked, no fallback: failsafe reset
//! ```
//!
//! # Design Decisions
//! - One failed probe of either kind is one failure
//! - Blocked endpoints stay blocked for the session unless the failsafe
//!   (or a manual clear) empties the list
//! - All state lives in an explicit context, never in statics

pub mod blocklist;
pub mod checker;
pub mod context;
pub mod tracker;
pub mod types;

pub use blocklist::{BlockOutcome, BlocklistRegistry};
pub use checker::EndpointHealthChecker;
pub use context::{EndpointHealthContext, FailureDisposition};
pub use tracker::FailureTracker;
pub use types::{is_valid_result, ConnectionStats, ProbeFailure, ProbeMethod, ProbeOutcome};
