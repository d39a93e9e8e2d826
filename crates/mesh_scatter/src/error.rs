//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, malformed source meshes, and the failure conditions of decoding a
//! record buffer (empty, truncated, or carrying non-finite slots).
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("no instance data to process")]
    EmptyBuffer,

    #[error("record buffer length {len} is not a multiple of the record length")]
    TruncatedBuffer { len: usize },

    #[error("malformed record {record}: slot {slot} ({field}) is not a finite float")]
    MalformedRecord {
        record: usize,
        slot: usize,
        field: &'static str,
    },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
