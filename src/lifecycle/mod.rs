//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → session store → catalog + context → transport → selector
//!
//! Cancellation (cancel.rs):
//!     Network switch / shutdown → CancelSignal → in-flight probes fail
//!
//! Signals (signals.rs):
//!     SIGINT → CancelSignal::trigger
//! ```

pub mod cancel;
pub mod signals;
pub mod startup;

pub use cancel::{CancelSignal, CancelToken};
pub use startup::build_selector;
