//! The payload carried across the bus (spec section 9, "Dynamic payload
//! carried across the bus"): a tagged union of request data, response data,
//! and an error marker, rather than the untyped `interface{}` the Go source's
//! `Event` struct carries (`original_source/pkg/concurrency/event_bus.go`).

use crate::error::VertexError;
use crate::resp::Resp;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Event {
    /// A decoded request frame arriving from a connection.
    Request { connection_id: Uuid, frame: Resp },
    /// A response frame destined for a connection.
    Response { connection_id: Uuid, frame: Resp },
    /// An out-of-band condition delivered in place of a normal payload, used
    /// for e.g. topic removal during shutdown (spec section 4.4.4,
    /// section 5's shutdown sequence).
    Error(VertexError),
}
