use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arbor_crypto::BlockHasher;
use arbor_types::BlockHash;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::error::{BlockError, BlockResult};
use crate::traits::{validate_block, BlockStore};

/// Filesystem block store.
///
/// Each block lives at `<root>/<hex hash>`. This layout is persisted state:
/// existing stores become unreadable if it changes.
///
/// Writes are staged in a temp file inside `root` and linked into place with
/// no-clobber semantics, so a reader never observes a partial block and a
/// second concurrent writer of the same hash is a harmless no-op.
#[derive(Clone, Debug)]
pub struct FsBlockStore {
    root: PathBuf,
    hasher: BlockHasher,
}

impl FsBlockStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>, hasher: BlockHasher) -> BlockResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root, hasher })
    }

    /// Where the block with this hash is (or would be) stored.
    pub fn location_on_disk(&self, hash: &BlockHash) -> PathBuf {
        self.root.join(hash.as_str())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn not_found(hash: &BlockHash, err: io::Error) -> BlockError {
    if err.kind() == io::ErrorKind::NotFound {
        BlockError::NotFound(hash.clone())
    } else {
        BlockError::Io(err)
    }
}

impl BlockStore for FsBlockStore {
    fn hasher(&self) -> BlockHasher {
        self.hasher
    }

    #[instrument(level = "debug", skip(self, data), fields(block.hash = %hash.short_hex(), len = data.len()))]
    fn write(&self, hash: &BlockHash, data: &[u8]) -> BlockResult<usize> {
        validate_block(&self.hasher, hash, data)?;

        let path = self.location_on_disk(hash);
        if path.try_exists()? {
            debug!("block already stored");
            return Ok(data.len());
        }

        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(data)?;
        staged.as_file().sync_all()?;

        match staged.persist_noclobber(&path) {
            Ok(_) => {
                debug!("block written");
                Ok(data.len())
            }
            // Another writer linked the same content first.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(data.len()),
            Err(e) => Err(BlockError::Io(e.error)),
        }
    }

    fn read(&self, hash: &BlockHash) -> BlockResult<Vec<u8>> {
        fs::read(self.location_on_disk(hash)).map_err(|e| not_found(hash, e))
    }

    fn size_on_disk(&self, hash: &BlockHash) -> BlockResult<u64> {
        fs::metadata(self.location_on_disk(hash))
            .map(|meta| meta.len())
            .map_err(|e| not_found(hash, e))
    }

    fn exists(&self, hash: &BlockHash) -> BlockResult<bool> {
        Ok(self.location_on_disk(hash).try_exists()?)
    }
}
