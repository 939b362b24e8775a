//! Append-only log persistence and replication bootstrap (spec section 4.7).
//!
//! Grounded on the teacher's buffered-writer-behind-a-lock shape in
//! `diskstore/cyanswf.rs`/`cyansfw.rs` (there, a raw `std::fs::File`; here, a
//! `BufWriter` so repeated small record writes don't each take a syscall),
//! and on `original_source/pkg/log/log.go` for the wire format itself
//! (see `record.rs`) and `pkg/replication/replica.go` for the bootstrap
//! protocol (see `replication.rs`).

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::VResult;

pub mod record;
pub mod replication;

pub use record::LogRecord;

/// A single append-only log file, writes serialized behind a lock the way
/// the teacher's `FileLock`-guarded writers serialize BGSAVE writers.
pub struct Log {
    path: PathBuf,
    writer: RwLock<BufWriter<File>>,
}

impl Log {
    /// Opens (creating if absent) the log file in append mode.
    pub fn open(path: impl Into<PathBuf>) -> VResult<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: RwLock::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and flushes, so a crash right after `append`
    /// returns never loses a record the caller believes is durable.
    pub fn append(&self, record: &LogRecord) -> VResult<()> {
        let mut writer = self.writer.write();
        record.write_to(&mut *writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn flush(&self) -> VResult<()> {
        self.writer.write().flush()?;
        Ok(())
    }

    /// Flushes, then streams the current file's bytes into `dest` -- the
    /// snapshot step of the master-side bootstrap send (spec section 4.7,
    /// "Replication").
    pub fn save_to(&self, dest: impl AsRef<Path>) -> VResult<()> {
        let mut writer = self.writer.write();
        writer.flush()?;
        fs::copy(&self.path, dest.as_ref())?;
        Ok(())
    }

    /// Replays every well-formed record in the log at `path`, in order.
    /// A record that fails to decode as protobuf is skipped with a warning
    /// rather than aborting the replay, mirroring `log.go`'s `ParseLog` loop
    /// which `continue`s past `errInvalidMessage`. A torn length prefix or
    /// payload (a log file truncated mid-write by a crash) stops replay at
    /// that point instead, since there is no way to resynchronize.
    pub fn replay(path: impl AsRef<Path>) -> VResult<Vec<LogRecord>> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut reader = BufReader::new(file);
        let mut records = Vec::new();
        loop {
            match LogRecord::read_one(&mut reader) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => break,
                Err(crate::error::VertexError::FramingError) => {
                    log::warn!("skipping undecodable log record in {}", path.display());
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resp::Resp;

    #[test]
    fn append_then_replay_round_trips_in_order() {
        let dir = std::env::temp_dir().join(format!("vertex-log-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("log.bin");
        let _ = fs::remove_file(&path);

        let log = Log::open(&path).unwrap();
        for i in 0..3 {
            let record = LogRecord::new(i, "h", "set", &[Resp::bulk("k")], "raw");
            log.append(&record).unwrap();
        }
        let replayed = Log::replay(&path).unwrap();
        assert_eq!(replayed.len(), 3);
        assert_eq!(replayed[0].index, 0);
        assert_eq!(replayed[2].index, 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn replay_of_missing_file_is_empty() {
        let records = Log::replay("/tmp/does-not-exist-vertex-log.bin").unwrap();
        assert!(records.is_empty());
    }
}
