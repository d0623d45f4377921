use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task with ID {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("cannot acquire lock for {}: timeout after {waited:?}", path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    /// The lock marker could not be created for a reason other than contention.
    #[error("cannot create lock file {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task description cannot be empty")]
    EmptyDescription,

    #[error("task description is {len} bytes long; the maximum is {max}")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("task ID must be greater than 0, got {0}")]
    InvalidId(i64),

    #[error("no task IDs left: the largest ID is already {}", i64::MAX)]
    IdOverflow,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse JSON from {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot encode tasks as JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("CSV error in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

