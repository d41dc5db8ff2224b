//! OS signal handling.
//!
//! Ctrl-C cancels in-flight probes so each records a failure instead of
//! vanishing with the process.

use tokio::task::JoinHandle;

use crate::lifecycle::cancel::CancelSignal;

/// Trigger `signal` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(signal: CancelSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, cancelling probes");
                signal.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}
