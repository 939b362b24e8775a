//! One-shot master-to-replica bootstrap (spec section 4.7, "Replication").
//!
//! Grounded on `original_source/pkg/replication/replica.go`'s `Receive()`:
//! a 4-byte little-endian length, then exactly that many bytes of a
//! log-file snapshot. A length of zero means "nothing to replay". The
//! `pkg/replication/replictaion.go` `ReplicationCenter`/websocket machinery
//! in the same package is unused by `replica.go`'s actual bootstrap path, so
//! nothing from it is carried over here -- this module only implements the
//! bootstrap that is actually exercised.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{Log, LogRecord};
use crate::error::VResult;

/// Sends the master's current log as a one-shot snapshot: `u32le` byte
/// length followed by the file's bytes. Flushes the log first so the
/// snapshot reflects every record acknowledged to callers so far.
pub async fn send_snapshot(log: &Log, stream: &mut TcpStream) -> VResult<()> {
    log.flush()?;
    let bytes = tokio::fs::read(log.path()).await?;
    stream.write_u32_le(bytes.len() as u32).await?;
    stream.write_all(&bytes).await?;
    stream.flush().await?;
    Ok(())
}

/// Receives a one-shot snapshot per `send_snapshot`'s wire shape and parses
/// it into records, exactly as `replica.go`'s `Receive` does via
/// `log.ParseLog`. A length of zero is "nothing to replay" and yields an
/// empty vector rather than an error, matching the Go source's `nil, nil`.
pub async fn receive_snapshot(stream: &mut TcpStream) -> VResult<Vec<LogRecord>> {
    let len = stream.read_u32_le().await?;
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf).await?;
    let mut reader = std::io::Cursor::new(buf);
    let mut records = Vec::new();
    loop {
        match LogRecord::read_one(&mut reader) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => break,
            Err(crate::error::VertexError::FramingError) => {
                log::warn!("skipping undecodable record in replication snapshot");
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}
