/// Errors from triple store operations.
#[derive(Debug, thiserror::Error)]
pub enum TripleError {
    /// The backing database reported a failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// A lock guarding in-memory indexes was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// The store refused a path or configuration at open time.
    #[error("cannot open store: {0}")]
    Open(String),

    /// I/O error from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::Error> for TripleError {
    fn from(err: redb::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Result alias for triple store operations.
pub type TripleResult<T> = Result<T, TripleError>;
