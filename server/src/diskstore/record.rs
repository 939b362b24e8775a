//! The on-disk append-only log record (spec section 4.7), grounded on
//! `original_source/pkg/log/log.go`: a 4-byte little-endian length prefix
//! followed by exactly that many bytes of a protobuf-encoded message.
//! `NewLog`/`PackLog`/`ParseLog` there become `LogRecord::new`/`pack`/`read_one`
//! here, with `prost` standing in for the Go source's `google.golang.org/protobuf`.

use std::io::{self, Read, Write};

use uuid::Uuid;

use crate::error::{VResult, VertexError};
use crate::resp::Resp;

include!(concat!(env!("OUT_DIR"), "/vertex.log.rs"));

impl LogRecord {
    /// Builds a record for one modifying command, stringifying its argument
    /// vector and the raw request the way `log.go`'s `NewLog` does for its
    /// `Arguments`/`RawRequest` fields.
    pub fn new(index: i32, host: &str, name: &str, args: &[Resp], raw_request: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            time: chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            host: host.to_owned(),
            name: name.to_owned(),
            index,
            arguments: args.iter().map(format_arg).collect(),
            raw_request: raw_request.to_owned(),
        }
    }

    /// Encodes this record with its 4-byte little-endian length prefix.
    /// Rejects a zero-length protobuf encoding with `EmptyLog`, mirroring
    /// `PackLog`'s `ErrEmptyLog` guard.
    pub fn pack(&self) -> VResult<Vec<u8>> {
        let body = prost::Message::encode_to_vec(self);
        if body.is_empty() {
            return Err(VertexError::EmptyLog);
        }
        let mut out = Vec::with_capacity(4 + body.len());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Writes `pack()`'s output straight to `w`.
    pub fn write_to(&self, w: &mut impl Write) -> VResult<()> {
        w.write_all(&self.pack()?)?;
        Ok(())
    }

    /// Reads one length-prefixed record from `r`.
    ///
    /// Mirrors `log.go`'s `readLog`/`ParseLog` pair: a clean EOF exactly at a
    /// record boundary (zero bytes read for the length prefix) is the normal
    /// end of the log and yields `Ok(None)`; any other short read is
    /// `UnexpectedEof`. A record whose payload fails to decode as protobuf is
    /// skipped by the caller's read loop (`log.go`'s `ParseLog` `continue`),
    /// not by this function -- it surfaces the decode error so the caller can
    /// choose to log and skip.
    pub fn read_one(r: &mut impl Read) -> VResult<Option<Self>> {
        let mut len_buf = [0u8; 4];
        match read_exact_or_eof(r, &mut len_buf)? {
            0 => return Ok(None),
            n if n < 4 => return Err(VertexError::UnexpectedEof),
            _ => {}
        }
        let len = u32::from_le_bytes(len_buf) as usize;
        let mut body = vec![0u8; len];
        let read = read_exact_or_eof(r, &mut body)?;
        if read < len {
            return Err(VertexError::UnexpectedEof);
        }
        let record = prost::Message::decode(body.as_slice()).map_err(|_| VertexError::FramingError)?;
        Ok(Some(record))
    }
}

/// Reads until `buf` is full or EOF, returning the number of bytes actually
/// read (as `std::io::Read::read_exact` doesn't report a partial count on
/// failure, which `readLog` needs to distinguish a clean from a torn EOF).
fn read_exact_or_eof(r: &mut impl Read, buf: &mut [u8]) -> VResult<usize> {
    let mut total = 0;
    while total < buf.len() {
        match r.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(total)
}

fn format_arg(r: &Resp) -> String {
    match r {
        Resp::SimpleString(s) => String::from_utf8_lossy(s).into_owned(),
        Resp::Error(s) => String::from_utf8_lossy(s).into_owned(),
        Resp::Integer(i) => i.to_string(),
        Resp::BulkString(Some(b)) => String::from_utf8_lossy(b).into_owned(),
        Resp::BulkString(None) => String::new(),
        Resp::Array(Some(items)) => items.iter().map(format_arg).collect::<Vec<_>>().join(" "),
        Resp::Array(None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_then_read_one_round_trips() {
        let record = LogRecord::new(
            1,
            "127.0.0.1",
            "set",
            &[Resp::bulk("k"), Resp::bulk("v")],
            "*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n",
        );
        let packed = record.pack().unwrap();
        let mut cursor = io::Cursor::new(packed);
        let parsed = LogRecord::read_one(&mut cursor).unwrap().unwrap();
        assert_eq!(parsed.name, "set");
        assert_eq!(parsed.arguments, vec!["k".to_owned(), "v".to_owned()]);
        assert!(LogRecord::read_one(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn read_one_on_empty_reader_is_clean_eof() {
        let mut cursor = io::Cursor::new(Vec::<u8>::new());
        assert!(LogRecord::read_one(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn read_one_on_torn_length_prefix_is_unexpected_eof() {
        let mut cursor = io::Cursor::new(vec![1u8, 2]);
        assert_eq!(
            LogRecord::read_one(&mut cursor).unwrap_err(),
            VertexError::UnexpectedEof
        );
    }
}
