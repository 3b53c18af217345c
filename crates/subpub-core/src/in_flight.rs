//! In-flight delivery accounting
//!
//! Every dispatched callback holds an [`InFlightGuard`]; the count drops when
//! the guard is dropped, which happens on normal return, on panic unwinding,
//! and when the runtime discards the task.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared counter of callback invocations that have been scheduled but have
/// not finished yet.
#[derive(Clone)]
pub(crate) struct InFlight {
    tx: Arc<watch::Sender<usize>>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Register one invocation; it stays counted until the guard drops.
    pub(crate) fn enter(&self) -> InFlightGuard {
        self.tx.send_modify(|n| *n += 1);
        InFlightGuard {
            in_flight: self.clone(),
        }
    }

    /// Current number of unfinished invocations
    pub(crate) fn count(&self) -> usize {
        *self.tx.borrow()
    }

    /// Resolves once the count reaches zero.
    pub(crate) async fn wait_idle(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

/// Keeps one invocation counted as in flight until dropped.
pub(crate) struct InFlightGuard {
    in_flight: InFlight,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.tx.send_modify(|n| *n = n.saturating_sub(1));
    }
}
