//! Caller-driven cancellation for in-flight requests.
//!
//! A thin pair over a `tokio::sync::watch` channel. The engine checks the
//! signal before every attempt and races it against every backoff wait, so
//! a cancelled request never issues another network call.

use tokio::sync::watch;

/// Creates a connected handle/signal pair.
pub fn cancellation() -> (CancellationHandle, CancellationSignal) {
    let (tx, rx) = watch::channel(false);
    (CancellationHandle { tx }, CancellationSignal { rx })
}

/// The caller's end. Dropping it without calling [`cancel`](Self::cancel)
/// leaves every signal un-cancelled forever.
#[derive(Debug)]
pub struct CancellationHandle {
    tx: watch::Sender<bool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Another signal observing this handle.
    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// The engine's end. Cheap to clone; one per request is typical.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Pends forever if the handle is dropped first.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_waiter() {
        let (handle, mut signal) = cancellation();
        assert!(!signal.is_cancelled());
        let waiter = tokio::spawn(async move {
            signal.cancelled().await;
            signal.is_cancelled()
        });
        handle.cancel();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_never_cancels() {
        let (handle, mut signal) = cancellation();
        drop(handle);
        let outcome = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(outcome.is_err());
    }

    #[test]
    fn extra_signals_observe_the_same_handle() {
        let (handle, first) = cancellation();
        let second = handle.signal();
        handle.cancel();
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
    }
}
