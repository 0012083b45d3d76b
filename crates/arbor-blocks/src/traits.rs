use arbor_crypto::BlockHasher;
use arbor_types::{BlockHash, BLOCK_SIZE};

use crate::error::{BlockError, BlockResult};

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - A block is written only if `len(data) <= BLOCK_SIZE` and
///   `hash(data) == hash`.
/// - Writing a hash that is already stored succeeds without rewriting.
/// - No partially written block is ever readable.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlockStore: Send + Sync {
    /// The hasher that defines this store's address space.
    fn hasher(&self) -> BlockHasher;

    /// Write a block under its declared hash. Returns the number of payload
    /// bytes the block holds.
    fn write(&self, hash: &BlockHash, data: &[u8]) -> BlockResult<usize>;

    /// Read a block's payload. Returns [`BlockError::NotFound`] if absent.
    fn read(&self, hash: &BlockHash) -> BlockResult<Vec<u8>>;

    /// Stored length of a block. Returns [`BlockError::NotFound`] if absent.
    fn size_on_disk(&self, hash: &BlockHash) -> BlockResult<u64>;

    /// Whether a block is stored under this hash.
    fn exists(&self, hash: &BlockHash) -> BlockResult<bool>;

    /// Hash a payload with this store's hasher.
    fn hash(&self, data: &[u8]) -> BlockHash {
        self.hasher().hash(data)
    }
}

/// Check the write-time preconditions shared by every backend.
pub(crate) fn validate_block(
    hasher: &BlockHasher,
    hash: &BlockHash,
    data: &[u8],
) -> BlockResult<()> {
    if data.len() as u64 > BLOCK_SIZE {
        return Err(BlockError::TooLarge {
            len: data.len(),
            max: BLOCK_SIZE,
        });
    }
    let actual = hasher.hash(data);
    if actual != *hash {
        return Err(BlockError::HashMismatch {
            expected: hash.clone(),
            actual,
        });
    }
    Ok(())
}
