//! The internal error vocabulary (spec section 7) and its translation to
//! wire-level RESP errors (spec section 4.6).
//!
//! Modeled on `actions::ActionError` in the teacher crate: a hand-rolled enum
//! with manual `From` impls rather than a derive-macro error crate, since the
//! teacher carries no `thiserror`/`anyhow` dependency in `server`.

use std::fmt;
use std::io;

/// Every internal error kind this system can surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexError {
    ArgumentInvalid,
    CommandNotFound,
    ContainerTypeMismatch,
    KeyMissing,
    FieldMissing,
    OutOfRange,
    NotInteger,
    EmptyList,
    NoSuchPivot,
    HashLengthMismatch,
    SortedSetEmpty,
    EntryNotFound,
    TopicRemoved,
    ChannelClosed,
    FutureCancelled,
    FutureFulfilled,
    FutureTimeout,
    FramingError,
    LengthMismatch,
    UnexpectedEof,
    EmptyLog,
    ConnectionClosed,
    Io(String),
}

impl fmt::Display for VertexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentInvalid => write!(f, "argument-invalid"),
            Self::CommandNotFound => write!(f, "command-not-found"),
            Self::ContainerTypeMismatch => write!(f, "container-type-mismatch"),
            Self::KeyMissing => write!(f, "key-missing"),
            Self::FieldMissing => write!(f, "field-missing"),
            Self::OutOfRange => write!(f, "out-of-range"),
            Self::NotInteger => write!(f, "not-integer"),
            Self::EmptyList => write!(f, "empty-list"),
            Self::NoSuchPivot => write!(f, "no-such-pivot"),
            Self::HashLengthMismatch => write!(f, "hash-length-mismatch"),
            Self::SortedSetEmpty => write!(f, "sorted-set-empty"),
            Self::EntryNotFound => write!(f, "entry-not-found"),
            Self::TopicRemoved => write!(f, "topic-removed"),
            Self::ChannelClosed => write!(f, "channel-closed"),
            Self::FutureCancelled => write!(f, "future-cancelled"),
            Self::FutureFulfilled => write!(f, "future-fulfilled"),
            Self::FutureTimeout => write!(f, "future-timeout"),
            Self::FramingError => write!(f, "framing-error"),
            Self::LengthMismatch => write!(f, "length-mismatch"),
            Self::UnexpectedEof => write!(f, "unexpected-eof"),
            Self::EmptyLog => write!(f, "empty-log"),
            Self::ConnectionClosed => write!(f, "connection-closed"),
            Self::Io(msg) => write!(f, "io-error: {msg}"),
        }
    }
}

impl std::error::Error for VertexError {}

impl From<io::Error> for VertexError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type VResult<T> = Result<T, VertexError>;

/// Translate an internal error into the wire-level RESP error message, per
/// the table in spec section 4.6.
pub fn wire_message(e: &VertexError) -> String {
    match e {
        VertexError::CommandNotFound => "ERR no such command".to_owned(),
        VertexError::ArgumentInvalid => "ERR invalid argument".to_owned(),
        VertexError::NotInteger => "ERR value is not an integer or out of range".to_owned(),
        VertexError::KeyMissing | VertexError::FieldMissing | VertexError::EntryNotFound => {
            "ERR no such key".to_owned()
        }
        VertexError::OutOfRange => "ERR index out of range".to_owned(),
        other => format!("ERR vertex server internal error, err={other}"),
    }
}
