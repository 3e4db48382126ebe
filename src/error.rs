//! Unified error type for all store operations.

use thiserror::Error;

/// Things that can go wrong when opening or persisting the store.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// File system problem (read, write, rename).
    #[error("i/o error: {0}")]
    Io(String),
    /// The storage file is not a JSON object of integer keys to strings.
    #[error("format error: {0}")]
    Format(String),
    /// Failed to serialize the map to bytes.
    #[error("serialization error: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
