//! Tree-structured file metadata engine for Arbor.
//!
//! The triple store only knows how to add, remove, and look up facts. This
//! crate synthesizes a mutable, invariant-preserving file tree on top of it:
//!
//! - [`Node`] is a handle to one file or directory. Reads go straight to the
//!   store; setters stage changes that [`Node::save`] commits as one
//!   stale/fresh fact batch.
//! - [`NodeGraph`] owns the root and arbitrates operations that span more
//!   than one node: creation, name lookup, moves, and cascading removal.
//! - File payload lives in the block store; a node only holds
//!   `offset-N -> hash` bindings.
//!
//! # Tree Invariants
//!
//! After every committed operation:
//!
//! 1. Exactly one node, the root, has no parent.
//! 2. No node is its own ancestor.
//! 3. No two children of a directory share a name.
//! 4. A directory has size 0.
//! 5. No modification time is after the commit time.
//!
//! Structural checks are check-then-act: callers that mutate the same
//! directory concurrently must serialize those operations themselves.

pub mod audit;
pub mod error;
pub mod links;
pub mod mime;
pub mod node;
pub mod nodegraph;
pub mod reader;
pub mod sort;

pub use audit::{AuditReport, Violation};
pub use error::{ErrorKind, GraphError, GraphResult};
pub use node::{Node, MAX_SIZE};
pub use nodegraph::NodeGraph;
pub use reader::NodeReader;
pub use sort::{sort_infos, sort_nodes, SortKey, SortOrder};
