use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid block hash: {0:?}")]
    InvalidHash(String),

    #[error("invalid node id: {0:?}")]
    InvalidNodeId(String),

    #[error("invalid mode: {0:?}")]
    InvalidMode(String),
}
