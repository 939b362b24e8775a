//! The process-wide topic registry (spec section 4.4.4). Grounded on
//! `original_source/pkg/concurrency/event_bus.go`'s `EventBus` interface
//! (whose body is left unimplemented in the Go source beyond the struct
//! shape); the operations below -- `publish`/`subscribe` against a named
//! topic, failing when the topic is absent -- are built directly from the
//! spec's textual description rather than ported code.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::channel::Receiver;
use super::event::Event;
use super::future::VFuture;
use super::topic::Topic;
use crate::error::{VResult, VertexError};

/// The topic set rarely mutates, so a read-write lock over the map is enough
/// (spec section 5, "Shared resources").
#[derive(Default)]
pub struct EventBus {
    topics: RwLock<HashMap<String, Topic>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_topic(&self, name: impl Into<String>) -> Topic {
        let name = name.into();
        let topic = Topic::new(name.clone());
        self.topics.write().insert(name, topic.clone());
        topic
    }

    pub fn publish(&self, topic: &str, event: Event) -> VResult<VFuture<usize>> {
        let topics = self.topics.read();
        let t = topics.get(topic).ok_or(VertexError::TopicRemoved)?;
        Ok(t.publish(event))
    }

    pub fn subscribe(&self, topic: &str, subscriber: impl Into<String>) -> VResult<Receiver> {
        let topics = self.topics.read();
        let t = topics.get(topic).ok_or(VertexError::TopicRemoved)?;
        Ok(t.subscribe(subscriber))
    }

    /// Removes a topic from the bus, first notifying pending receivers with
    /// a `topic-removed` marker event (spec section 5's shutdown sequence).
    pub async fn remove_topic(&self, name: &str) {
        let topic = self.topics.write().remove(name);
        if let Some(t) = topic {
            t.remove().await;
        }
    }
}
