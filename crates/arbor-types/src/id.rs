use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The reserved identifier of the single root directory.
///
/// This literal is persisted in the triple store as the object of every
/// top-level `hasParent` fact, so it must never change.
pub const ROOT_NODE_ID: &str = "rootNode";

/// Identifier of a node in the metadata graph.
///
/// Ids are assigned once at creation and never change. Every node except
/// the root carries a random UUID; the root carries [`ROOT_NODE_ID`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// The id of the root node.
    pub fn root() -> Self {
        Self(ROOT_NODE_ID.to_string())
    }

    /// Allocate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Parse an id read back from storage or supplied by a caller.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidNodeId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns `true` if this is the root id.
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_NODE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
