//! Content hashing for Arbor.
//!
//! A block's hash is both its identity and its integrity check. The
//! algorithm is chosen once per store: the hex digest names the block file
//! on disk and is persisted in every `offset-N` binding.
//!
//! All hashing wraps established libraries; there is no custom cryptography.

pub mod hasher;

pub use hasher::{BlockHasher, HashAlgorithm, ParseAlgorithmError};
