use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::session::TimerRequest;

/// Arms per-question timeouts and delivers expiry events as generation
/// tokens on a channel.
///
/// At most one timer is armed at a time: arming a new one first cancels the
/// pending one. Cancellation is best-effort (the task is aborted); the
/// session's generation guard makes any timer that slips through a no-op,
/// so the two mechanisms together satisfy the "a cancelled timer can never
/// transition state" contract.
pub struct TimeoutScheduler {
    tx: mpsc::UnboundedSender<u64>,
    pending: Option<JoinHandle<()>>,
}

impl TimeoutScheduler {
    /// Create a scheduler and the receiver its expiry events arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, pending: None }, rx)
    }

    /// Arm a timer for the given request, cancelling any pending one.
    pub fn arm(&mut self, request: TimerRequest) {
        self.disarm();
        debug!(
            generation = request.generation,
            limit_ms = request.limit_ms,
            "arming question timeout"
        );

        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(request.limit_ms)).await;
            // Receiver gone means the session is being torn down.
            let _ = tx.send(request.generation);
        }));
    }

    /// Cancel the pending timer, if any.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for TimeoutScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}
