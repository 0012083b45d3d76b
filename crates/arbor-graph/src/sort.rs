//! Ordering for directory listings.

use std::cmp::Ordering;

use arbor_types::NodeInfo;
use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::node::Node;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// By name, byte-wise.
    #[default]
    Alphabetical,
    /// By modification time, oldest first.
    DateModified,
}

/// A sort key and direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    pub key: SortKey,
    pub reversed: bool,
}

impl SortOrder {
    pub const fn new(key: SortKey) -> Self {
        Self {
            key,
            reversed: false,
        }
    }

    /// The same key in the opposite direction.
    pub const fn reversed(self) -> Self {
        Self {
            key: self.key,
            reversed: !self.reversed,
        }
    }

    fn compare(&self, a: &NodeInfo, b: &NodeInfo) -> Ordering {
        let by_key = match self.key {
            SortKey::Alphabetical => a.name.cmp(&b.name),
            SortKey::DateModified => a.mtime.cmp(&b.mtime),
        };
        let by_key = if self.reversed { by_key.reverse() } else { by_key };
        // Ties fall back to id so listings are deterministic.
        by_key.then_with(|| a.id.cmp(&b.id))
    }
}

impl From<SortKey> for SortOrder {
    fn from(key: SortKey) -> Self {
        Self::new(key)
    }
}

pub fn sort_infos(infos: &mut [NodeInfo], order: SortOrder) {
    infos.sort_by(|a, b| order.compare(a, b));
}

/// Sort node handles. Each node's attributes are read once.
pub fn sort_nodes(nodes: Vec<Node>, order: SortOrder) -> GraphResult<Vec<Node>> {
    let mut keyed = nodes
        .into_iter()
        .map(|node| Ok((node.node_info()?, node)))
        .collect::<GraphResult<Vec<_>>>()?;
    keyed.sort_by(|(a, _), (b, _)| order.compare(a, b));
    Ok(keyed.into_iter().map(|(_, node)| node).collect())
}
