//! A named fan-out primitive (spec section 4.4.3), grounded on
//! `original_source/pkg/concurrency/topic.go`. `distributeEvent`'s
//! goroutine-per-subscriber send plus a `sync.WaitGroup` becomes a
//! `tokio::task::JoinSet`; `batchRemove` of subscribers that reported
//! `Closed` runs the same way, after the fan-out completes.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinSet;

use super::channel::{self, Receiver, SendOutcome, DEFAULT_EXPIRY};
use super::event::Event;
use super::future::VFuture;
use crate::error::VertexError;

#[derive(Clone)]
pub struct Topic {
    name: Arc<str>,
    subscribers: Arc<DashMap<String, channel::Sender>>,
}

impl Topic {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            subscribers: Arc::new(DashMap::new()),
        }
    }

    pub fn subscribe(&self, subscriber: impl Into<String>) -> Receiver {
        self.subscribe_with_options(subscriber, 0, DEFAULT_EXPIRY)
    }

    pub fn subscribe_with_options(
        &self,
        subscriber: impl Into<String>,
        size: usize,
        expiry: Duration,
    ) -> Receiver {
        let (rx, tx) = channel::channel(size, expiry);
        self.subscribers.insert(subscriber.into(), tx);
        rx
    }

    /// Delivers `event` to every current subscriber concurrently; subscribers
    /// that report `Closed` are removed after the fan-out. Resolves to the
    /// count of successful deliveries.
    pub fn publish(&self, event: Event) -> VFuture<usize> {
        let subs: Vec<(String, channel::Sender)> = self
            .subscribers
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let subscribers = self.subscribers.clone();
        let name = self.name.clone();
        VFuture::spawn(async move {
            let mut set = JoinSet::new();
            for (subscriber, sender) in subs {
                let event = event.clone();
                set.spawn(async move { (subscriber, sender.send(event).await) });
            }
            let mut success = 0usize;
            let mut closed = Vec::new();
            while let Some(joined) = set.join_next().await {
                let Ok((subscriber, outcome)) = joined else {
                    continue;
                };
                match outcome {
                    SendOutcome::Success => success += 1,
                    SendOutcome::Closed => closed.push(subscriber),
                    SendOutcome::Expired => {
                        log::info!(
                            "send event to subscriber expired. topic={name}, subscriber={subscriber}"
                        );
                    }
                }
            }
            for subscriber in closed {
                subscribers.remove(&subscriber);
            }
            Ok(success)
        })
    }

    /// Publishes a `topic-removed` marker to every subscriber and waits for
    /// the fan-out to finish.
    pub async fn remove(&self) {
        let fut = self.publish(Event::Error(VertexError::TopicRemoved));
        let _ = fut.get().await;
    }
}
