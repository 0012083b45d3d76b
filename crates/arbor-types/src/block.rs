use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The fixed block size (1 MiB).
///
/// Every block offset is a multiple of this value and no block payload may
/// exceed it. Changing it invalidates the `offset-N` bindings of existing
/// stores.
pub const BLOCK_SIZE: u64 = 1024 * 1024;

/// Content address of a block: the lowercase hex digest of its payload.
///
/// The hex string doubles as the block's file name on disk, so only
/// `[0-9a-f]` characters are accepted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockHash(String);

impl BlockHash {
    /// Build a hash from raw digest bytes.
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Parse a hex digest. Uppercase input is normalized to lowercase.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidHash(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.short_hex())
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BlockHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BlockHash {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<BlockHash> for String {
    fn from(hash: BlockHash) -> Self {
        hash.0
    }
}

/// One bound block of a file: the payload hash at a byte offset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockInfo {
    pub hash: BlockHash,
    pub offset: u64,
}

impl BlockInfo {
    pub fn new(hash: BlockHash, offset: u64) -> Self {
        Self { hash, offset }
    }
}
