//! Foundation types for Arbor.
//!
//! Every other Arbor crate depends on `arbor-types`. The types here are the
//! shared vocabulary between the metadata graph and the block store.
//!
//! # Key Types
//!
//! - [`NodeId`] -- Identity of a file or directory node (random UUID, or the root id)
//! - [`BlockHash`] -- Content address of a block (lowercase hex digest)
//! - [`Mode`] -- Permission/type bit-field with a reserved directory bit
//! - [`NodeInfo`] -- Serializable attribute snapshot of a node
//! - [`BlockInfo`] -- One `(hash, offset)` binding of a file
//! - [`BLOCK_SIZE`] -- The fixed block size all offsets are aligned to

pub mod block;
pub mod error;
pub mod id;
pub mod info;
pub mod mode;

pub use block::{BlockHash, BlockInfo, BLOCK_SIZE};
pub use error::TypeError;
pub use id::NodeId;
pub use info::NodeInfo;
pub use mode::Mode;
