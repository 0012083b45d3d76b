use arbor_types::BlockHash;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// No block is stored under this hash.
    #[error("block not found: {0}")]
    NotFound(BlockHash),

    /// The payload exceeds the fixed block size.
    #[error("data length {len} exceeds max block size {max}")]
    TooLarge { len: usize, max: u64 },

    /// The payload does not hash to the declared hash.
    #[error("data hash {actual} does not match block hash {expected}")]
    HashMismatch {
        expected: BlockHash,
        actual: BlockHash,
    },

    /// A lock guarding in-memory blocks was poisoned.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// I/O error from the block directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlockError {
    /// Whether this error is an integrity violation (oversized or mismatched
    /// payload) rather than a storage failure.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::TooLarge { .. } | Self::HashMismatch { .. })
    }
}

/// Result alias for block store operations.
pub type BlockResult<T> = Result<T, BlockError>;
