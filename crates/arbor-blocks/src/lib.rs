//! Content-addressed block storage for Arbor.
//!
//! File payload is cut into blocks of at most [`BLOCK_SIZE`] bytes. Each
//! block is stored once under its content hash, no matter how many files or
//! offsets reference it. The block store never sees the metadata graph: it
//! is a pure hash-keyed byte store.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`FsBlockStore`] -- one file per block, named by its hex hash
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A write is accepted only if the payload fits in a block and hashes to
//!    the declared hash.
//! 2. Writing an existing hash is a successful no-op (deduplication).
//! 3. A block becomes visible only once fully written.
//! 4. Reads trust the write-time verification and do not re-hash.
//!
//! [`BLOCK_SIZE`]: arbor_types::BLOCK_SIZE

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{BlockError, BlockResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
