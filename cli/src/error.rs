//! CLI error vocabulary. Grounded on the teacher's `cli::error::CliError`:
//! a small hand-rolled enum over argument, I/O and protocol failures, with
//! no dependency on the server crate's own `VertexError`.

use core::fmt;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    ArgsErr(String),
    QueryError(String),
    IoError(std::io::Error),
    ProtocolError(String),
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgsErr(e) => write!(f, "incorrect arguments. {e}"),
            Self::QueryError(e) => write!(f, "invalid query. {e}"),
            Self::IoError(e) => write!(f, "i/o error. {e}"),
            Self::ProtocolError(e) => write!(f, "protocol error. {e}"),
        }
    }
}

impl std::error::Error for CliError {}
