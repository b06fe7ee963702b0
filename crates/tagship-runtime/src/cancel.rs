//! Run cancellation
//!
//! One [`CancelHandle`] per run, fired by Ctrl-C. The build matrix and every
//! unit hold a [`CancelSignal`]; a fired run starts no new unit, aborts the
//! running ones, and never reaches assembly or publish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Fires cancellation for one run
#[derive(Clone)]
pub struct CancelHandle {
    triggered: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Cancel the run; later calls do nothing
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            tracing::warn!("pipeline run cancellation requested");
            let _ = self.sender.send(());
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// A signal for the matrix or one build unit
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            triggered: self.triggered.clone(),
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// What units watch to learn that their run was cancelled
pub struct CancelSignal {
    triggered: Arc<AtomicBool>,
    receiver: broadcast::Receiver<()>,
}

impl CancelSignal {
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolves once the run is cancelled, at once if it already was.
    ///
    /// A run whose handle is dropped unfired is never cancelled, so this
    /// stays pending.
    pub async fn cancelled(&mut self) {
        if self.is_triggered() {
            return;
        }
        match self.receiver.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => {
                if !self.is_triggered() {
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

impl Clone for CancelSignal {
    fn clone(&self) -> Self {
        Self {
            triggered: self.triggered.clone(),
            receiver: self.receiver.resubscribe(),
        }
    }
}
