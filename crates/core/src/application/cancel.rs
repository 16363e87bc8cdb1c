// Cancellation Token and cancellable delay

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Caller side of a cancellation signal
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// Returns immediately if it already was. If the handle is dropped without
    /// cancelling, this never resolves.
    pub async fn cancelled(&mut self) {
        let closed = self.rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Owner side of a cancellation signal
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Another token observing this handle
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Create a cancellation channel
pub fn cancel_channel() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Which side of a cancellable sleep fired first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    Elapsed,
    Cancelled,
}

/// Sleep for `duration` unless `cancel` fires first. Cancellation wins ties.
pub async fn cancellable_sleep(duration: Duration, cancel: Option<&CancelToken>) -> SleepOutcome {
    let Some(token) = cancel else {
        sleep(duration).await;
        return SleepOutcome::Elapsed;
    };

    let mut token = token.clone();
    tokio::select! {
        biased;
        _ = token.cancelled() => SleepOutcome::Cancelled,
        _ = sleep(duration) => SleepOutcome::Elapsed,
    }
}
