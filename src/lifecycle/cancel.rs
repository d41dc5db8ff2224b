//! Cancellation of in-flight probes.
//!
//! Triggered on shutdown or when the caller switches networks. A probe that
//! observes the signal is recorded as a failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast cancellation with sticky state: tokens taken after the
/// trigger still observe it.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Token for one probe.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
            triggered: self.triggered.clone(),
        }
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a `CancelSignal`.
#[derive(Debug)]
pub struct CancelToken {
    rx: broadcast::Receiver<()>,
    triggered: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolves once the signal is triggered. Never resolves if the signal
    /// is dropped untriggered.
    pub async fn cancelled(&mut self) {
        if self.is_cancelled() {
            return;
        }
        match self.rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => {
                if !self.is_cancelled() {
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}
