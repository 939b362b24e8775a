//! The asynchronous event fabric (spec section 4.4): a bounded
//! time-expiring channel, a cancellable future, a fan-out topic, and a
//! process-wide event bus hosting named topics. Grounded on
//! `original_source/pkg/concurrency/{data_channel,future,topic,event_bus}.go`,
//! translated into `tokio::sync`/`tokio::task` idioms the way the teacher's
//! `dbnet` module already layers connection handling over `tokio::sync`.

pub mod bus;
pub mod channel;
pub mod event;
pub mod future;
pub mod topic;

pub use bus::EventBus;
pub use channel::{Receiver, Sender, SendOutcome};
pub use event::Event;
pub use future::VFuture;
pub use topic::Topic;
