use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::worker::ByteRange;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The file operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Open,
    Metadata,
    Seek,
    Read,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoOp::Open => "open",
            IoOp::Metadata => "stat",
            IoOp::Seek => "seek in",
            IoOp::Read => "read",
        })
    }
}

/// Fatal errors of an aggregation run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to {op} {}", .path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid record at byte {offset} of {}", .path.display())]
    Parse {
        path: PathBuf,
        offset: u64,
        #[source]
        source: ParseError,
    },

    #[error("worker for bytes {range} panicked")]
    WorkerPanicked { range: ByteRange },
}

impl Error {
    pub(crate) fn io(op: IoOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// A line that does not match `<key>;<value>`.
///
/// The offending line is copied (lossily) only when the error is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing `;` delimiter in {line:?}")]
    MissingDelimiter { line: String },

    #[error("key is not valid UTF-8 in {line:?}")]
    InvalidKey { line: String },

    #[error("malformed value in {line:?}")]
    MalformedValue { line: String },

    #[error("value out of range in {line:?}")]
    OutOfRange { line: String },
}

impl ParseError {
    pub fn line(&self) -> &str {
        match self {
            ParseError::MissingDelimiter { line }
            | ParseError::InvalidKey { line }
            | ParseError::MalformedValue { line }
            | ParseError::OutOfRange { line } => line,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to write measurements")]
    Io(#[from] io::Error),

    #[error("invalid temperature distribution")]
    Distribution(#[from] rand_distr::NormalError),

    #[error("no stations to generate measurements for")]
    NoStations,
}
