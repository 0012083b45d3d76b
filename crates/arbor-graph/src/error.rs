use arbor_blocks::BlockError;
use arbor_triples::TripleError;
use arbor_types::NodeId;

/// The category of a [`GraphError`].
///
/// An outer API layer maps each kind to its own status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    Conflict,
    Integrity,
    CommitFailed,
    Storage,
}

/// Errors from graph operations.
///
/// Every variant except `CommitFailed` is raised before anything is written,
/// so the persisted state is untouched.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A referenced node or block does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A locally checkable invariant would be violated.
    #[error("{0}")]
    InvalidState(String),

    /// The operation would break a tree-wide invariant.
    #[error("{0}")]
    Conflict(String),

    /// Payload is oversized or does not match its hash.
    #[error("integrity error: {0}")]
    Integrity(BlockError),

    /// The fact batch could not be applied. When `partial` is set, the
    /// adapter is not atomic and some facts may have been applied.
    #[error("commit failed for node {node} (partial: {partial}): {source}")]
    CommitFailed {
        node: NodeId,
        partial: bool,
        #[source]
        source: TripleError,
    },

    /// A read from the triple store failed.
    #[error("storage error: {0}")]
    Storage(#[from] TripleError),

    /// The block store failed for a reason other than integrity.
    #[error("block store error: {0}")]
    Block(BlockError),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::CommitFailed { .. } => ErrorKind::CommitFailed,
            Self::Storage(_) | Self::Block(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

impl From<BlockError> for GraphError {
    fn from(err: BlockError) -> Self {
        match err {
            BlockError::NotFound(hash) => Self::NotFound(format!("block {hash}")),
            e if e.is_integrity() => Self::Integrity(e),
            e => Self::Block(e),
        }
    }
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
