// ============================================================
// Layer 3: Cancellation Token
// ============================================================
// One token is shared by the acquisition task and every
// question in flight. Synchronous code polls the flag at its
// own checkpoints (top of a download attempt, around the
// readiness wait). Code that may block on the network races
// its await against `cancelled()` instead, so a stalled peer
// cannot hide the request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::domain::error::{QaError, QaResult};

#[derive(Debug, Default)]
struct Signal {
    flag:   AtomicBool,
    notify: Notify,
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Signal>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; visible to every clone.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before reading the flag so a concurrent cancel()
        // cannot slip between the two.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Checkpoint: `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> QaResult<()> {
        if self.is_cancelled() {
            Err(QaError::Cancelled)
        } else {
            Ok(())
        }
    }
}
