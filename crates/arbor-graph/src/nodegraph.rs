use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arbor_blocks::BlockStore;
use arbor_triples::{Transaction, TripleStore};
use arbor_types::{Mode, NodeId, NodeInfo};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::error::{GraphError, GraphResult};
use crate::links;
use crate::mime::mime_type_for;
use crate::node::{Node, Pending};

/// The tree-level authority over a triple store and a block store.
///
/// A graph is an explicitly constructed handle; cloning it is cheap and all
/// clones share the same stores. It owns the root and every operation whose
/// validity depends on more than one node.
#[derive(Clone)]
pub struct NodeGraph {
    store: Arc<dyn TripleStore>,
    blocks: Arc<dyn BlockStore>,
}

impl NodeGraph {
    /// Attach to the given stores, creating the root if it does not exist.
    pub fn open(store: Arc<dyn TripleStore>, blocks: Arc<dyn BlockStore>) -> GraphResult<Self> {
        let graph = Self { store, blocks };
        let mut root = graph.root();
        if root.exists()? {
            debug!("attached to existing root");
        } else {
            root.pending = Pending {
                name: Some("root".to_string()),
                mode: Some(Mode::new(Mode::DIR)),
                mtime: Some(Utc::now()),
                ..Pending::default()
            };
            root.save()?;
            info!("created root node");
        }
        Ok(graph)
    }

    pub fn root(&self) -> Node {
        Node::new(NodeId::root(), self.clone())
    }

    pub fn store(&self) -> &dyn TripleStore {
        self.store.as_ref()
    }

    pub fn block_store(&self) -> &dyn BlockStore {
        self.blocks.as_ref()
    }

    /// A handle to the node with this id. No I/O is done; use
    /// [`Node::exists`] to check that it resolves.
    pub fn node_with_id(&self, id: NodeId) -> Node {
        Node::new(id, self.clone())
    }

    /// Create a node under `parent_id`. The MIME type is derived from the
    /// name's extension.
    pub fn new_node(&self, name: &str, parent_id: &NodeId, mode: Mode) -> GraphResult<Node> {
        let mut info = NodeInfo::new(parent_id.clone(), name, mode);
        if !mode.is_dir() {
            info.mime_type = mime_type_for(name).to_string();
        }
        self.new_node_with_attributes(&info)
    }

    /// Create a node from a full attribute snapshot.
    ///
    /// `info.id` is ignored and a fresh id is allocated. An empty
    /// `mime_type` leaves the type unset.
    #[instrument(level = "debug", skip(self, info), fields(name = %info.name))]
    pub fn new_node_with_attributes(&self, info: &NodeInfo) -> GraphResult<Node> {
        let parent = info
            .parent_id
            .clone()
            .ok_or_else(|| GraphError::invalid("Cannot add node without a parent"))?;
        if info.name.is_empty() {
            return Err(GraphError::invalid("Cannot add nameless node"));
        }
        let mut node = Node::new(NodeId::generate(), self.clone());
        node.pending = Pending {
            name: Some(info.name.clone()),
            parent: Some(parent),
            mode: Some(info.mode),
            mtime: Some(info.mtime),
            size: Some(info.size),
            mime_type: (!info.mime_type.is_empty()).then(|| info.mime_type.clone()),
        };
        node.save()?;
        debug!(node = %node.id(), "node created");
        Ok(node)
    }

    pub fn create_directory(&self, parent_id: &NodeId, name: &str) -> GraphResult<Node> {
        self.new_node(name, parent_id, Mode::dir(0o755))
    }

    /// The child of `parent_id` named `name`, if any.
    pub fn node_with_name(&self, parent_id: &NodeId, name: &str) -> GraphResult<Option<Node>> {
        let named: HashSet<String> = self
            .store
            .subjects_with(links::NAME, name)?
            .into_iter()
            .collect();
        if named.is_empty() {
            return Ok(None);
        }
        let found = self
            .store
            .subjects_with(links::PARENT, parent_id.as_str())?
            .into_iter()
            .find(|id| named.contains(id));
        match found {
            Some(id) => Ok(Some(self.node_with_id(self.parse_id(&id)?))),
            None => Ok(None),
        }
    }

    /// Rename and re-parent `node` in one commit.
    ///
    /// Any other changes staged on `node` are committed with the move. On
    /// failure every staged change is discarded.
    #[instrument(level = "debug", skip(self, node), fields(node = %node.id(), to = %new_parent_id))]
    pub fn move_node(&self, node: &mut Node, new_name: &str, new_parent_id: &NodeId) -> GraphResult<()> {
        let result = (|| {
            if node.is_root() {
                return Err(GraphError::invalid("Cannot move root node"));
            }
            node.set_name(new_name)?;
            node.move_to(new_parent_id)?;
            node.save()
        })();
        if result.is_err() {
            node.discard_changes();
        }
        result
    }

    /// Remove `node` and all of its descendants, children before parents.
    #[instrument(level = "debug", skip(self, node), fields(node = %node.id()))]
    pub fn remove_node(&self, node: &Node) -> GraphResult<()> {
        if node.is_root() {
            return Err(GraphError::invalid("Cannot delete root node"));
        }
        if !node.exists()? {
            return Err(GraphError::NotFound(format!("node {}", node.id())));
        }

        // Pre-order walk; removing in reverse visits every child before its parent.
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![node.id().clone()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                warn!(node = %id, "cycle detected during removal");
                continue;
            }
            stack.extend(self.child_ids(&id)?);
            order.push(id);
        }

        for id in order.into_iter().rev() {
            let victim = self.node_with_id(id);
            let mut tx = Transaction::new();
            for fact in victim.persisted_facts()? {
                tx.remove(fact);
            }
            self.commit(victim.id(), &tx)?;
            debug!(node = %victim.id(), "node removed");
        }
        Ok(())
    }

    /// Whether `candidate` is `ancestor` or lies beneath it.
    pub fn is_descendant(&self, candidate: &NodeId, ancestor: &NodeId) -> GraphResult<bool> {
        let mut seen = HashSet::new();
        let mut current = Some(candidate.clone());
        while let Some(id) = current {
            if id == *ancestor {
                return Ok(true);
            }
            if !seen.insert(id.clone()) {
                warn!(node = %id, "cycle detected in parent chain");
                return Ok(false);
            }
            current = self.node_with_id(id).parent_id()?;
        }
        Ok(false)
    }

    pub(crate) fn child_ids(&self, parent_id: &NodeId) -> GraphResult<Vec<NodeId>> {
        self.store
            .subjects_with(links::PARENT, parent_id.as_str())?
            .iter()
            .map(|id| self.parse_id(id))
            .collect()
    }

    fn parse_id(&self, raw: &str) -> GraphResult<NodeId> {
        NodeId::parse(raw).map_err(|e| GraphError::invalid(e.to_string()))
    }

    /// Check that `node` may be placed under `parent_id` as `name`.
    pub(crate) fn check_placement(&self, node: &NodeId, parent_id: &NodeId, name: &str) -> GraphResult<()> {
        let parent = self.node_with_id(parent_id.clone());
        if !parent.exists()? {
            return Err(GraphError::NotFound(format!("parent node {parent_id}")));
        }
        if !parent.is_dir()? {
            return Err(GraphError::invalid("Cannot add node to a non-directory"));
        }
        if self.is_descendant(parent_id, node)? {
            return Err(GraphError::invalid("Cannot move node inside itself"));
        }
        if let Some(existing) = self.node_with_name(parent_id, name)? {
            if existing.id() != node {
                return Err(GraphError::Conflict(format!(
                    "Node with name {name} already exists in {}",
                    parent.name()?
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn commit(&self, node: &NodeId, tx: &Transaction) -> GraphResult<()> {
        self.store
            .apply(tx)
            .map_err(|source| GraphError::CommitFailed {
                node: node.clone(),
                partial: !self.store.is_atomic(),
                source,
            })
    }
}

impl fmt::Debug for NodeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeGraph")
            .field("algorithm", &self.blocks.hasher().algorithm())
            .finish_non_exhaustive()
    }
}
