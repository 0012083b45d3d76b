use std::collections::HashMap;
use std::sync::RwLock;

use arbor_crypto::BlockHasher;
use arbor_types::BlockHash;

use crate::error::{BlockError, BlockResult};
use crate::traits::{validate_block, BlockStore};

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock` and
/// cloned on read.
#[derive(Default)]
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<BlockHash, Vec<u8>>>,
    hasher: BlockHasher,
}

impl InMemoryBlockStore {
    pub fn new(hasher: BlockHasher) -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            hasher,
        }
    }

    /// Number of distinct blocks stored.
    pub fn len(&self) -> BlockResult<usize> {
        Ok(self
            .blocks
            .read()
            .map_err(|e| BlockError::LockPoisoned(e.to_string()))?
            .len())
    }

    pub fn is_empty(&self) -> BlockResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl BlockStore for InMemoryBlockStore {
    fn hasher(&self) -> BlockHasher {
        self.hasher
    }

    fn write(&self, hash: &BlockHash, data: &[u8]) -> BlockResult<usize> {
        validate_block(&self.hasher, hash, data)?;
        let mut blocks = self
            .blocks
            .write()
            .map_err(|e| BlockError::LockPoisoned(e.to_string()))?;
        blocks.entry(hash.clone()).or_insert_with(|| data.to_vec());
        Ok(data.len())
    }

    fn read(&self, hash: &BlockHash) -> BlockResult<Vec<u8>> {
        let blocks = self
            .blocks
            .read()
            .map_err(|e| BlockError::LockPoisoned(e.to_string()))?;
        blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| BlockError::NotFound(hash.clone()))
    }

    fn size_on_disk(&self, hash: &BlockHash) -> BlockResult<u64> {
        let blocks = self
            .blocks
            .read()
            .map_err(|e| BlockError::LockPoisoned(e.to_string()))?;
        blocks
            .get(hash)
            .map(|data| data.len() as u64)
            .ok_or_else(|| BlockError::NotFound(hash.clone()))
    }

    fn exists(&self, hash: &BlockHash) -> BlockResult<bool> {
        let blocks = self
            .blocks
            .read()
            .map_err(|e| BlockError::LockPoisoned(e.to_string()))?;
        Ok(blocks.contains_key(hash))
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len().unwrap_or_default())
            .field("algorithm", &self.hasher.algorithm())
            .finish()
    }
}
