//! The RESP (REdis Serialization Protocol) codec: framing and encoding of
//! typed protocol values over byte streams (spec section 4.1).
//!
//! Grounded on the teacher's `protocol` module shape -- a parser with its own
//! error enum and a `responses` module holding canonical byte renderings --
//! reimplemented without the teacher's raw-pointer `UnsafeSlice`/`UnsafeElement`
//! tricks. `bytes::Bytes`/`BytesMut` (already a teacher dependency) stand in
//! for those.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

#[cfg(test)]
mod tests;

/// A single RESP protocol value (spec section 3, "Protocol value").
#[derive(Debug, Clone, PartialEq)]
pub enum Resp {
    SimpleString(Bytes),
    Error(Bytes),
    Integer(i64),
    /// `None` renders as the null-bulk-string (`$-1\r\n`).
    BulkString(Option<Bytes>),
    /// `None` renders as the null-array (`*-1\r\n`).
    Array(Option<Vec<Resp>>),
}

impl Resp {
    pub fn bulk(b: impl Into<Bytes>) -> Self {
        Self::BulkString(Some(b.into()))
    }

    pub fn null_bulk() -> Self {
        Self::BulkString(None)
    }

    pub fn null_array() -> Self {
        Self::Array(None)
    }

    pub fn ok() -> Self {
        Self::SimpleString(Bytes::from_static(b"OK"))
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(Bytes::from(msg.into()))
    }

    pub fn array(items: Vec<Resp>) -> Self {
        Self::Array(Some(items))
    }

    /// Extract this value as a bulk string's bytes, if it is one.
    pub fn as_bulk(&self) -> Option<&[u8]> {
        match self {
            Self::BulkString(Some(b)) => Some(b),
            _ => None,
        }
    }

    /// Deterministic byte rendering (spec section 4.1, "Encoder contract").
    pub fn encode(&self) -> BytesMut {
        let mut out = BytesMut::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut BytesMut) {
        match self {
            Self::SimpleString(s) => {
                out.extend_from_slice(b"+");
                out.extend_from_slice(s);
                out.extend_from_slice(b"\r\n");
            }
            Self::Error(e) => {
                out.extend_from_slice(b"-");
                out.extend_from_slice(e);
                out.extend_from_slice(b"\r\n");
            }
            Self::Integer(i) => {
                out.extend_from_slice(b":");
                out.extend_from_slice(i.to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            Self::BulkString(None) => out.extend_from_slice(b"$-1\r\n"),
            Self::BulkString(Some(b)) => {
                out.extend_from_slice(b"$");
                out.extend_from_slice(b.len().to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
                out.extend_from_slice(b);
                out.extend_from_slice(b"\r\n");
            }
            Self::Array(None) => out.extend_from_slice(b"*-1\r\n"),
            Self::Array(Some(items)) => {
                out.extend_from_slice(b"*");
                out.extend_from_slice(items.len().to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
                for item in items {
                    item.encode_into(out);
                }
            }
        }
    }
}

/// Errors that can arise while decoding a RESP frame (spec section 4.1,
/// "Error modes").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    MalformedHeader,
    LengthMismatch,
    UnexpectedEof,
    UnknownType,
}

/// Reads one [`Resp`] value at a time from a buffered, async byte source.
///
/// Framing is line-oriented for type/length headers and byte-count-exact for
/// bulk payloads (spec section 4.1, "Decoder contract").
pub struct Decoder<'a, R> {
    reader: &'a mut R,
}

impl<'a, R: AsyncRead + Unpin> Decoder<'a, R> {
    pub fn new(reader: &'a mut R) -> Self {
        Self { reader }
    }

    /// Read a line terminated by `\r\n`. An isolated `\n` not preceded by
    /// `\r` is not a terminator -- the decoder keeps reading until it sees
    /// the full `\r\n` pair. Returns `Ok(None)` on a clean close (no bytes
    /// consumed at all for this line).
    async fn read_line(&mut self) -> Result<Option<Vec<u8>>, FramingError> {
        let mut line = Vec::new();
        let mut saw_any = false;
        loop {
            let byte = match self.reader.read_u8().await {
                Ok(b) => b,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    if saw_any {
                        return Err(FramingError::UnexpectedEof);
                    }
                    return Ok(None);
                }
                Err(_) => return Err(FramingError::UnexpectedEof),
            };
            saw_any = true;
            if byte == b'\r' {
                let next = self
                    .reader
                    .read_u8()
                    .await
                    .map_err(|_| FramingError::UnexpectedEof)?;
                if next != b'\n' {
                    return Err(FramingError::MalformedHeader);
                }
                return Ok(Some(line));
            }
            line.push(byte);
        }
    }

    async fn read_exact_payload(&mut self, len: usize) -> Result<Bytes, FramingError> {
        let mut buf = vec![0u8; len];
        self.reader
            .read_exact(&mut buf)
            .await
            .map_err(|_| FramingError::UnexpectedEof)?;
        let mut term = [0u8; 2];
        self.reader
            .read_exact(&mut term)
            .await
            .map_err(|_| FramingError::UnexpectedEof)?;
        if &term != b"\r\n" {
            return Err(FramingError::LengthMismatch);
        }
        Ok(Bytes::from(buf))
    }

    fn parse_len(line: &[u8]) -> Result<i64, FramingError> {
        std::str::from_utf8(line)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(FramingError::MalformedHeader)
    }

    /// Decode one value. Returns `Ok(None)` on a clean close before any byte
    /// of a new frame was read.
    pub async fn decode(&mut self) -> Result<Option<Resp>, FramingError> {
        let line = match self.read_line().await? {
            Some(l) => l,
            None => return Ok(None),
        };
        if line.is_empty() {
            return Err(FramingError::MalformedHeader);
        }
        let (tag, rest) = (line[0], &line[1..]);
        let value = match tag {
            b'+' => Resp::SimpleString(Bytes::copy_from_slice(rest)),
            b'-' => Resp::Error(Bytes::copy_from_slice(rest)),
            b':' => {
                let i = std::str::from_utf8(rest)
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or(FramingError::MalformedHeader)?;
                Resp::Integer(i)
            }
            b'$' => {
                let len = Self::parse_len(rest)?;
                if len < 0 {
                    Resp::BulkString(None)
                } else {
                    Resp::BulkString(Some(self.read_exact_payload(len as usize).await?))
                }
            }
            b'*' => {
                let len = Self::parse_len(rest)?;
                if len < 0 {
                    Resp::Array(None)
                } else {
                    let mut items = Vec::with_capacity(len as usize);
                    for _ in 0..len {
                        match Box::pin(self.decode()).await? {
                            Some(v) => items.push(v),
                            None => return Err(FramingError::UnexpectedEof),
                        }
                    }
                    Resp::Array(Some(items))
                }
            }
            _ => return Err(FramingError::UnknownType),
        };
        Ok(Some(value))
    }
}
