//! Triple store adapter for the Arbor metadata graph.
//!
//! The graph engine stores every node attribute and every parent/child edge
//! as a `(subject, predicate, object)` fact. The adapter offers exactly four
//! capabilities: add a fact, remove a fact, look up the object for a
//! `(subject, predicate)` pair, and look up all subjects for a
//! `(predicate, object)` pair (the reverse edge).
//!
//! # Storage Backends
//!
//! All backends implement the [`TripleStore`] trait:
//!
//! - [`InMemoryTripleStore`] -- `BTreeMap` indexes for tests and embedding
//! - [`RedbTripleStore`] -- persistent store backed by a redb database file
//!
//! # Design Rules
//!
//! 1. Adds are idempotent: a fact is present or absent, never duplicated.
//! 2. Removing an absent fact is a no-op.
//! 3. A [`Transaction`] removes its stale facts before adding its fresh ones.
//! 4. Both backends apply a transaction atomically.
//! 5. Reverse lookups use a maintained index, never a scan.

pub mod error;
pub mod memory;
pub mod redb_store;
pub mod traits;
pub mod triple;

pub use error::{TripleError, TripleResult};
pub use memory::InMemoryTripleStore;
pub use redb_store::RedbTripleStore;
pub use traits::TripleStore;
pub use triple::{Transaction, Triple};
