use std::fmt;
use std::str::FromStr;

use arbor_types::BlockHash;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Digest algorithm used to address blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1, 40 hex characters. Compatible with stores written by earlier
    /// releases.
    #[default]
    Sha1,
    /// BLAKE3, 64 hex characters.
    Blake3,
}

impl HashAlgorithm {
    /// Length of the hex digest this algorithm produces.
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Sha1 => 40,
            Self::Blake3 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "sha1"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown hash algorithm: {0}")]
pub struct ParseAlgorithmError(String);

impl FromStr for HashAlgorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "blake3" => Ok(Self::Blake3),
            other => Err(ParseAlgorithmError(other.to_string())),
        }
    }
}

/// Block content hasher.
///
/// Deterministic: byte-identical input always yields the same [`BlockHash`].
/// Collisions are astronomically unlikely but not engineered against
/// adversarial input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockHasher {
    algorithm: HashAlgorithm,
}

impl BlockHasher {
    pub const SHA1: Self = Self {
        algorithm: HashAlgorithm::Sha1,
    };
    pub const BLAKE3: Self = Self {
        algorithm: HashAlgorithm::Blake3,
    };

    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash a block payload.
    pub fn hash(&self, data: &[u8]) -> BlockHash {
        match self.algorithm {
            HashAlgorithm::Sha1 => BlockHash::from_digest(&Sha1::digest(data)),
            HashAlgorithm::Blake3 => BlockHash::from_digest(blake3::hash(data).as_bytes()),
        }
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &BlockHash) -> bool {
        self.hash(data) == *expected
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}
