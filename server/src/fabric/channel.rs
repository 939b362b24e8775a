//! A bounded, time-expiring channel (spec section 4.4.1), grounded on
//! `original_source/pkg/concurrency/data_channel.go`'s receiver/sender pair.
//! The Go version selects over a data channel, a close channel and a
//! `time.After` timer; here that becomes a `tokio::select!` over the
//! underlying `mpsc` channel, a shared close [`Notify`], and
//! `tokio::time::sleep`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};

use super::event::Event;
use crate::error::VertexError;

/// Matches the Go source's default of 10ms (spec section 4.4.1).
pub const DEFAULT_EXPIRY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Success,
    Closed,
    Expired,
}

struct Shared {
    closed: AtomicBool,
    close_notify: Notify,
}

pub struct Receiver {
    rx: mpsc::Receiver<Event>,
    shared: Arc<Shared>,
}

#[derive(Clone)]
pub struct Sender {
    tx: mpsc::Sender<Event>,
    shared: Arc<Shared>,
    expiry: Duration,
}

/// `size = 0` maps onto a capacity-1 `tokio::sync::mpsc` channel, the
/// closest approximation of true rendezvous tokio's bounded channel offers
/// (it requires capacity >= 1); see DESIGN.md.
pub fn channel(size: usize, expiry: Duration) -> (Receiver, Sender) {
    let (tx, rx) = mpsc::channel(size.max(1));
    let shared = Arc::new(Shared {
        closed: AtomicBool::new(false),
        close_notify: Notify::new(),
    });
    (
        Receiver {
            rx,
            shared: shared.clone(),
        },
        Sender { tx, shared, expiry },
    )
}

impl Receiver {
    /// Blocks until an event arrives or the channel is closed. Close always
    /// supersedes any buffered items (spec section 8, channel properties).
    pub async fn receive(&mut self) -> Result<Event, VertexError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(VertexError::ChannelClosed);
        }
        match self.rx.recv().await {
            Some(event) => Ok(event),
            None => Err(VertexError::ChannelClosed),
        }
    }

    /// Idempotent.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            self.rx.close();
            self.shared.close_notify.notify_waiters();
        }
    }
}

impl Sender {
    pub async fn send(&self, event: Event) -> SendOutcome {
        if self.shared.closed.load(Ordering::Acquire) {
            return SendOutcome::Closed;
        }
        tokio::select! {
            biased;
            _ = self.shared.close_notify.notified() => SendOutcome::Closed,
            result = self.tx.send(event) => match result {
                Ok(()) => SendOutcome::Success,
                Err(_) => SendOutcome::Closed,
            },
            _ = tokio::time::sleep(self.expiry) => SendOutcome::Expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event::Error(VertexError::CommandNotFound)
    }

    #[tokio::test]
    async fn send_on_closed_channel_is_closed() {
        let (rx, tx) = channel(1, DEFAULT_EXPIRY);
        rx.close();
        assert_eq!(tx.send(sample_event()).await, SendOutcome::Closed);
    }

    #[tokio::test]
    async fn receive_on_closed_channel_supersedes_buffered_items() {
        let (mut rx, tx) = channel(4, DEFAULT_EXPIRY);
        assert_eq!(tx.send(sample_event()).await, SendOutcome::Success);
        assert_eq!(tx.send(sample_event()).await, SendOutcome::Success);
        rx.close();
        assert!(matches!(rx.receive().await, Err(VertexError::ChannelClosed)));
    }

    #[tokio::test]
    async fn send_past_expiry_is_discarded() {
        let (_rx, tx) = channel(1, Duration::from_millis(15));
        // Fills the single buffer slot; nobody ever drains it.
        assert_eq!(tx.send(sample_event()).await, SendOutcome::Success);
        assert_eq!(tx.send(sample_event()).await, SendOutcome::Expired);
    }
}
