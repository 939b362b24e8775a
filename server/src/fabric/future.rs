//! A future wrapping a spawned task (spec section 4.4.2), grounded on
//! `original_source/pkg/concurrency/future.go`. The Go version races a
//! `doneChan`/`cancelChan` pair with `select`; this keeps the same shape but
//! guards the terminal state behind a `parking_lot::Mutex` so `cancel()` and
//! task completion can't both "win" -- the Go source has the identical race
//! (both branches of its `select` close a channel), so this isn't a
//! correctness regression, just made explicit.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{VResult, VertexError};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Signal {
    Pending,
    Done,
    Cancelled,
}

struct Inner<T> {
    state: Mutex<Signal>,
    notify: Notify,
    result: Mutex<Option<VResult<T>>>,
}

/// Construction schedules the wrapped task immediately on a background
/// worker (spec section 4.4.2).
pub struct VFuture<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for VFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> VFuture<T> {
    pub fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = VResult<T>> + Send + 'static,
    {
        let inner = Arc::new(Inner {
            state: Mutex::new(Signal::Pending),
            notify: Notify::new(),
            result: Mutex::new(None),
        });
        let worker = inner.clone();
        tokio::spawn(async move {
            let outcome = task.await;
            let mut state = worker.state.lock();
            if *state == Signal::Pending {
                *worker.result.lock() = Some(outcome);
                *state = Signal::Done;
                drop(state);
                worker.notify.notify_waiters();
            }
        });
        Self { inner }
    }

    /// Fresh -> cancelled. Fails `future-fulfilled` if already completed,
    /// `future-cancelled` on a second cancel.
    pub fn cancel(&self) -> VResult<()> {
        let mut state = self.inner.state.lock();
        match *state {
            Signal::Done => Err(VertexError::FutureFulfilled),
            Signal::Cancelled => Err(VertexError::FutureCancelled),
            Signal::Pending => {
                *state = Signal::Cancelled;
                drop(state);
                self.inner.notify.notify_waiters();
                Ok(())
            }
        }
    }

    /// Blocks until completion or cancellation.
    pub async fn wait(&self) -> VResult<()> {
        loop {
            let notified = self.inner.notify.notified();
            match *self.inner.state.lock() {
                Signal::Done => return Ok(()),
                Signal::Cancelled => return Err(VertexError::FutureCancelled),
                Signal::Pending => {}
            }
            notified.await;
        }
    }

    /// Returns `future-timeout` without affecting the task.
    pub async fn wait_for(&self, d: Duration) -> VResult<()> {
        tokio::select! {
            r = self.wait() => r,
            _ = tokio::time::sleep(d) => Err(VertexError::FutureTimeout),
        }
    }

    /// Blocks until completion or cancellation; a cancelled future's result
    /// is unobservable.
    pub async fn get(&self) -> VResult<T> {
        self.wait().await?;
        self.inner
            .result
            .lock()
            .clone()
            .expect("Signal::Done implies a stored result")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_after_complete_is_already_fulfilled() {
        let f = VFuture::spawn(async { Ok(42) });
        assert_eq!(f.get().await.unwrap(), 42);
        assert!(matches!(f.cancel(), Err(VertexError::FutureFulfilled)));
    }

    #[tokio::test]
    async fn cancel_after_cancel_is_already_cancelled() {
        let f = VFuture::spawn(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(1)
        });
        assert!(f.cancel().is_ok());
        assert!(matches!(f.cancel(), Err(VertexError::FutureCancelled)));
        assert!(matches!(f.wait().await, Err(VertexError::FutureCancelled)));
    }

    #[tokio::test]
    async fn completed_and_cancelled_are_mutually_exclusive() {
        let completed = VFuture::spawn(async { Ok(1) });
        assert!(completed.get().await.is_ok());
        assert!(completed.cancel().is_err());

        let cancelled = VFuture::spawn(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(1)
        });
        cancelled.cancel().unwrap();
        assert!(matches!(cancelled.wait().await, Err(VertexError::FutureCancelled)));
    }

    #[tokio::test]
    async fn wait_for_short_timeout_then_get_still_resolves() {
        let f = VFuture::spawn(async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            Ok(7)
        });
        assert!(matches!(
            f.wait_for(Duration::from_millis(5)).await,
            Err(VertexError::FutureTimeout)
        ));
        assert_eq!(f.get().await.unwrap(), 7);
    }
}
