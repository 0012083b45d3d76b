use std::fmt;
use std::str::FromStr;

use arbor_blocks::BlockError;
use arbor_triples::{Transaction, Triple};
use arbor_types::{BlockHash, BlockInfo, Mode, NodeId, NodeInfo, BLOCK_SIZE};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, instrument, warn};

use crate::error::{GraphError, GraphResult};
use crate::links;
use crate::nodegraph::NodeGraph;
use crate::reader::NodeReader;
use crate::sort::{sort_infos, SortOrder};

/// Attribute changes staged by setters and not yet committed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pending {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) mode: Option<Mode>,
    pub(crate) mtime: Option<DateTime<Utc>>,
    pub(crate) size: Option<u64>,
    pub(crate) mime_type: Option<String>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Largest size a file may declare. Sizes persist as signed 64-bit values.
pub const MAX_SIZE: u64 = i64::MAX as u64;

pub(crate) fn encode_mtime(mtime: &DateTime<Utc>) -> String {
    mtime.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode_mtime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// A handle to one file or directory in a [`NodeGraph`].
///
/// Accessors always read the committed state from the triple store; a
/// value that is absent reads as its zero value (empty string, `0`, the Unix
/// epoch, `Mode(0)`). Only [`exists`](Node::exists) tells a missing node
/// apart from a blank one.
///
/// Setters validate against the effective state (staged value if any,
/// otherwise committed) and stage the change. Nothing reaches storage until
/// [`save`](Node::save) or [`write_data`](Node::write_data).
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    graph: NodeGraph,
    pub(crate) pending: Pending,
}

impl Node {
    pub(crate) fn new(id: NodeId, graph: NodeGraph) -> Self {
        Self {
            id,
            graph,
            pending: Pending::default(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    fn raw(&self, predicate: &str) -> GraphResult<Option<String>> {
        Ok(self.graph.store().value_of(self.id.as_str(), predicate)?)
    }

    fn parsed<T: FromStr>(&self, predicate: &str) -> GraphResult<Option<T>> {
        Ok(self.raw(predicate)?.and_then(|raw| match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(node = %self.id, predicate, value = %raw, "malformed value in store");
                None
            }
        }))
    }

    // --- Committed attributes ---

    /// `true` iff the node has a committed name.
    pub fn exists(&self) -> GraphResult<bool> {
        Ok(!self.name()?.is_empty())
    }

    pub fn name(&self) -> GraphResult<String> {
        Ok(self.raw(links::NAME)?.unwrap_or_default())
    }

    pub fn size(&self) -> GraphResult<u64> {
        let size: Option<u64> = self.parsed(links::SIZE)?;
        Ok(match size {
            Some(size) if size > MAX_SIZE => {
                warn!(node = %self.id, size, "size out of range in store");
                0
            }
            size => size.unwrap_or_default(),
        })
    }

    pub fn mode(&self) -> GraphResult<Mode> {
        Ok(self.parsed(links::MODE)?.unwrap_or_default())
    }

    pub fn mtime(&self) -> GraphResult<DateTime<Utc>> {
        let Some(raw) = self.raw(links::MTIME)? else {
            return Ok(DateTime::default());
        };
        Ok(decode_mtime(&raw).unwrap_or_else(|| {
            warn!(node = %self.id, value = %raw, "malformed mtime in store");
            DateTime::default()
        }))
    }

    /// MIME type; empty when unknown.
    pub fn mime_type(&self) -> GraphResult<String> {
        Ok(self.raw(links::TYPE)?.unwrap_or_default())
    }

    pub fn is_dir(&self) -> GraphResult<bool> {
        Ok(self.mode()?.is_dir())
    }

    /// The committed parent id. `None` for the root or a missing node.
    pub fn parent_id(&self) -> GraphResult<Option<NodeId>> {
        self.parsed(links::PARENT)
    }

    pub fn parent(&self) -> GraphResult<Option<Node>> {
        Ok(self
            .parent_id()?
            .map(|id| Node::new(id, self.graph.clone())))
    }

    /// Committed children, ordered by id.
    pub fn children(&self) -> GraphResult<Vec<Node>> {
        Ok(self
            .graph
            .child_ids(&self.id)?
            .into_iter()
            .map(|id| Node::new(id, self.graph.clone()))
            .collect())
    }

    /// Snapshot of the committed attributes.
    pub fn node_info(&self) -> GraphResult<NodeInfo> {
        Ok(NodeInfo {
            id: self.id.clone(),
            parent_id: self.parent_id()?,
            name: self.name()?,
            size: self.size()?,
            mtime: self.mtime()?,
            mode: self.mode()?,
            mime_type: self.mime_type()?,
        })
    }

    /// Children as [`NodeInfo`] in listing order.
    pub fn listing(&self, order: SortOrder) -> GraphResult<Vec<NodeInfo>> {
        let mut infos = self
            .children()?
            .iter()
            .map(Node::node_info)
            .collect::<GraphResult<Vec<_>>>()?;
        sort_infos(&mut infos, order);
        Ok(infos)
    }

    // --- Effective (staged or committed) attributes ---

    fn effective_name(&self) -> GraphResult<String> {
        match &self.pending.name {
            Some(name) => Ok(name.clone()),
            None => self.name(),
        }
    }

    fn effective_parent(&self) -> GraphResult<Option<NodeId>> {
        match &self.pending.parent {
            Some(parent) => Ok(Some(parent.clone())),
            None => self.parent_id(),
        }
    }

    fn effective_mode(&self) -> GraphResult<Mode> {
        match self.pending.mode {
            Some(mode) => Ok(mode),
            None => self.mode(),
        }
    }

    fn effective_size(&self) -> GraphResult<u64> {
        match self.pending.size {
            Some(size) => Ok(size),
            None => self.size(),
        }
    }

    // --- Setters ---

    pub fn set_name(&mut self, name: impl Into<String>) -> GraphResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(GraphError::invalid("Cannot add nameless node"));
        }
        self.pending.name = Some(name);
        Ok(())
    }

    pub fn chmod(&mut self, mode: Mode) -> GraphResult<()> {
        let current = self.effective_mode()?;
        if mode.is_dir() && !current.is_dir() && self.effective_size()? > 0 {
            return Err(GraphError::invalid(
                "File has size, cannot change to directory",
            ));
        }
        if !mode.is_dir() && current.is_dir() && !self.graph.child_ids(&self.id)?.is_empty() {
            return Err(GraphError::invalid(
                "Directory has children, cannot change to file",
            ));
        }
        self.pending.mode = Some(mode);
        Ok(())
    }

    /// Stage a new size. Data may only be written below the committed size.
    pub fn resize(&mut self, size: u64) -> GraphResult<()> {
        if size > MAX_SIZE {
            return Err(GraphError::invalid(format!(
                "Size {size} exceeds the maximum of {MAX_SIZE}"
            )));
        }
        if size > 0 && self.effective_mode()?.is_dir() {
            return Err(GraphError::invalid("Cannot resize a directory"));
        }
        self.pending.size = Some(size);
        Ok(())
    }

    pub fn touch(&mut self, mtime: DateTime<Utc>) -> GraphResult<()> {
        if mtime > Utc::now() {
            return Err(GraphError::invalid("Cannot set modified time in the future"));
        }
        self.pending.mtime = Some(mtime);
        Ok(())
    }

    /// Stage a new parent.
    pub fn move_to(&mut self, parent_id: &NodeId) -> GraphResult<()> {
        if self.is_root() {
            return Err(GraphError::invalid("Cannot move root node"));
        }
        if self.graph.is_descendant(parent_id, &self.id)? {
            return Err(GraphError::invalid("Cannot move node inside itself"));
        }
        self.pending.parent = Some(parent_id.clone());
        Ok(())
    }

    pub fn set_mime_type(&mut self, mime_type: impl Into<String>) {
        self.pending.mime_type = Some(mime_type.into());
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn discard_changes(&mut self) {
        self.pending = Pending::default();
    }

    // --- Commit ---

    fn validate(&self) -> GraphResult<()> {
        let name = self.effective_name()?;
        if name.is_empty() {
            return Err(GraphError::invalid("Cannot add nameless node"));
        }

        let parent = self.effective_parent()?;
        match (&parent, self.is_root()) {
            (Some(_), true) => return Err(GraphError::invalid("Root node cannot have a parent")),
            (None, false) => return Err(GraphError::invalid("Node has no parent")),
            _ => {}
        }

        let mode = self.effective_mode()?;
        let size = self.effective_size()?;
        if size > MAX_SIZE {
            return Err(GraphError::invalid(format!(
                "Size {size} exceeds the maximum of {MAX_SIZE}"
            )));
        }
        if mode.is_dir() && size > 0 {
            return Err(GraphError::invalid("Directory cannot have a size"));
        }
        if self.pending.mode.is_some()
            && !mode.is_dir()
            && !self.graph.child_ids(&self.id)?.is_empty()
        {
            return Err(GraphError::invalid(
                "Directory has children, cannot change to file",
            ));
        }

        if self.pending.mtime.is_some_and(|t| t > Utc::now()) {
            return Err(GraphError::invalid("Cannot set modified time in the future"));
        }

        let renamed = self.pending.name.is_some() && self.pending.name != Some(self.name()?);
        let moved = self.pending.parent.is_some() && self.pending.parent != self.parent_id()?;
        if let (true, Some(parent)) = (renamed || moved, &parent) {
            self.graph.check_placement(&self.id, parent, &name)?;
        }
        Ok(())
    }

    /// Upsert one scalar: stage removal of the committed value and addition
    /// of the new one, unless they are equal.
    fn diff(&self, tx: &mut Transaction, predicate: &str, value: Option<String>) -> GraphResult<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let old = self.raw(predicate)?;
        if old.as_deref() == Some(value.as_str()) {
            return Ok(());
        }
        if let Some(old) = old {
            tx.remove(Triple::new(self.id.as_str(), predicate, old));
        }
        tx.add(Triple::new(self.id.as_str(), predicate, value));
        Ok(())
    }

    fn transaction(&self) -> GraphResult<Transaction> {
        let p = &self.pending;
        let mut tx = Transaction::new();
        self.diff(&mut tx, links::NAME, p.name.clone())?;
        self.diff(&mut tx, links::PARENT, p.parent.as_ref().map(ToString::to_string))?;
        self.diff(&mut tx, links::MODE, p.mode.map(|m| m.bits().to_string()))?;
        self.diff(&mut tx, links::MTIME, p.mtime.as_ref().map(encode_mtime))?;
        self.diff(&mut tx, links::SIZE, p.size.map(|s| s.to_string()))?;
        self.diff(&mut tx, links::TYPE, p.mime_type.clone())?;

        // Shrinking unbinds every block at or past the new end.
        if let Some(new_size) = p.size {
            if new_size < self.size()? {
                for (offset, hash) in self.bindings()? {
                    if offset >= new_size {
                        tx.remove(Triple::new(self.id.as_str(), links::offset_link(offset), hash));
                    }
                }
            }
        }
        Ok(tx)
    }

    /// Commit staged changes as one stale/fresh batch.
    ///
    /// Re-validates the node even when nothing is staged. A save with no
    /// effective change does not touch storage. Staged changes are kept if
    /// validation or the commit fails.
    #[instrument(level = "debug", skip(self), fields(node = %self.id))]
    pub fn save(&mut self) -> GraphResult<()> {
        self.validate()?;
        let tx = self.transaction()?;
        if tx.is_empty() {
            debug!("nothing to commit");
        } else {
            self.graph.commit(&self.id, &tx)?;
            debug!(stale = tx.stale().len(), fresh = tx.fresh().len(), "node saved");
        }
        self.pending = Pending::default();
        Ok(())
    }

    /// Every committed fact with this node as subject.
    pub(crate) fn persisted_facts(&self) -> GraphResult<Vec<Triple>> {
        Ok(self.graph.store().facts_about(self.id.as_str())?)
    }

    /// Committed block bindings as `(offset, hash)`, in offset order.
    fn bindings(&self) -> GraphResult<Vec<(u64, String)>> {
        let mut bindings: Vec<(u64, String)> = self
            .persisted_facts()?
            .into_iter()
            .filter_map(|t| Some((links::parse_offset_link(&t.predicate)?, t.object)))
            .collect();
        bindings.sort_unstable();
        Ok(bindings)
    }

    // --- Data ---

    /// Store `data` as the block at `offset` and bind it to this node.
    ///
    /// Staged attribute changes are saved first, so a `resize` followed by a
    /// write behaves as one would expect. `offset` must be block-aligned and
    /// the write must end within the committed size. The payload is persisted
    /// before the binding is committed.
    #[instrument(level = "debug", skip(self, data), fields(node = %self.id, len = data.len()))]
    pub fn write_data(&mut self, data: &[u8], offset: u64) -> GraphResult<BlockHash> {
        if self.has_pending_changes() {
            self.save()?;
        }
        if !self.exists()? {
            return Err(GraphError::NotFound(format!("node {}", self.id)));
        }
        if self.is_dir()? {
            return Err(GraphError::invalid("Cannot write data to a directory"));
        }
        if offset % BLOCK_SIZE != 0 {
            return Err(GraphError::invalid(format!(
                "Offset {offset} is not a multiple of the block size {BLOCK_SIZE}"
            )));
        }
        if data.len() as u64 > BLOCK_SIZE {
            return Err(GraphError::Integrity(BlockError::TooLarge {
                len: data.len(),
                max: BLOCK_SIZE,
            }));
        }
        if data.is_empty() {
            return Err(GraphError::invalid("Cannot write an empty block"));
        }
        let size = self.size()?;
        offset
            .checked_add(data.len() as u64)
            .filter(|end| *end <= size)
            .ok_or_else(|| {
                GraphError::invalid(format!(
                    "Write of {} bytes at offset {offset} extends past size {size}",
                    data.len()
                ))
            })?;

        let blocks = self.graph.block_store();
        let hash = blocks.hash(data);
        blocks.write(&hash, data)?;

        let link = links::offset_link(offset);
        let mut tx = Transaction::new();
        match self.raw(&link)? {
            Some(old) if old == hash.as_str() => {
                debug!(block.hash = %hash.short_hex(), "block already bound");
                return Ok(hash);
            }
            Some(old) => {
                tx.remove(Triple::new(self.id.as_str(), link.as_str(), old));
            }
            None => {}
        }
        tx.add(Triple::new(self.id.as_str(), link, hash.as_str()));
        self.graph.commit(&self.id, &tx)?;
        debug!(block.hash = %hash.short_hex(), "block bound");
        Ok(hash)
    }

    /// The block bound at `offset`. `None` for directories and unbound
    /// offsets.
    pub fn block_with_offset(&self, offset: u64) -> GraphResult<Option<BlockInfo>> {
        if self.is_dir()? {
            return Ok(None);
        }
        let hash: Option<BlockHash> = self.parsed(&links::offset_link(offset))?;
        Ok(hash.map(|hash| BlockInfo::new(hash, offset)))
    }

    /// Bound blocks below the committed size, in offset order. Holes are
    /// omitted.
    pub fn blocks(&self) -> GraphResult<Vec<BlockInfo>> {
        if self.is_dir()? {
            return Ok(Vec::new());
        }
        let size = self.size()?;
        let mut blocks = Vec::new();
        for (offset, raw) in self.bindings()? {
            if offset >= size {
                break;
            }
            match raw.parse::<BlockHash>() {
                Ok(hash) => blocks.push(BlockInfo::new(hash, offset)),
                Err(_) => warn!(node = %self.id, offset, value = %raw, "malformed value in store"),
            }
        }
        Ok(blocks)
    }

    /// Payload of the block bound at `offset`.
    pub fn read_block(&self, offset: u64) -> GraphResult<Option<Vec<u8>>> {
        match self.block_with_offset(offset)? {
            Some(block) => Ok(Some(self.graph.block_store().read(&block.hash)?)),
            None => Ok(None),
        }
    }

    /// A `Read + Seek` view over the committed content.
    pub fn reader(&self) -> GraphResult<NodeReader> {
        if self.is_dir()? {
            return Err(GraphError::invalid("Cannot read data from a directory"));
        }
        NodeReader::new(self.clone())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::nodegraph::testing::graph;
    use arbor_triples::TripleStore;
    use chrono::Duration;

    fn file(graph: &NodeGraph, name: &str) -> Node {
        graph.new_node(name, &NodeId::root(), Mode::new(0o644)).unwrap()
    }

    #[test]
    fn missing_node_reads_zero_values() {
        let (graph, _, _) = graph();
        let ghost = graph.node_with_id(NodeId::generate());
        assert!(!ghost.exists().unwrap());
        assert_eq!(ghost.name().unwrap(), "");
        assert_eq!(ghost.size().unwrap(), 0);
        assert_eq!(ghost.mode().unwrap(), Mode::default());
        assert_eq!(ghost.mtime().unwrap(), DateTime::<Utc>::default());
        assert!(ghost.parent().unwrap().is_none());
        assert!(ghost.children().unwrap().is_empty());
    }

    #[test]
    fn setters_do_not_touch_storage() {
        let (graph, store, _) = graph();
        let mut node = file(&graph, "a.txt");
        let commits = store.commit_count();

        node.set_name("b.txt").unwrap();
        node.resize(10).unwrap();
        assert_eq!(node.name().unwrap(), "a.txt");
        assert_eq!(node.size().unwrap(), 0);
        assert_eq!(store.commit_count(), commits);

        node.save().unwrap();
        assert_eq!(node.name().unwrap(), "b.txt");
        assert_eq!(node.size().unwrap(), 10);
        assert_eq!(store.commit_count(), commits + 1);
    }

    #[test]
    fn save_twice_is_noop() {
        let (graph, store, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(42).unwrap();
        node.save().unwrap();
        let commits = store.commit_count();
        let facts = store.len().unwrap();

        node.save().unwrap();
        assert_eq!(store.commit_count(), commits);
        assert_eq!(store.len().unwrap(), facts);
    }

    #[test]
    fn restaging_committed_value_is_noop() {
        let (graph, store, _) = graph();
        let mut node = file(&graph, "a.txt");
        let commits = store.commit_count();
        node.set_name("a.txt").unwrap();
        node.save().unwrap();
        assert_eq!(store.commit_count(), commits);
    }

    #[test]
    fn update_leaves_single_value() {
        let (graph, store, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.set_name("b.txt").unwrap();
        node.save().unwrap();
        assert!(!store
            .contains(&Triple::new(node.id().as_str(), links::NAME, "a.txt"))
            .unwrap());
        assert!(store
            .subjects_with(links::NAME, "a.txt")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn nameless_node_rejected() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        let err = node.set_name("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.to_string(), "Cannot add nameless node");

        let mut ghost = graph.node_with_id(NodeId::generate());
        assert_eq!(ghost.save().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn chmod_file_with_size_to_dir_rejected() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(1).unwrap();
        let err = node.chmod(Mode::dir(0o755)).unwrap_err();
        assert_eq!(err.to_string(), "File has size, cannot change to directory");
    }

    #[test]
    fn chmod_dir_with_children_to_file_rejected() {
        let (graph, _, _) = graph();
        let mut dir = graph.create_directory(&NodeId::root(), "docs").unwrap();
        graph.new_node("a.txt", dir.id(), Mode::new(0o644)).unwrap();
        let err = dir.chmod(Mode::new(0o644)).unwrap_err();
        assert_eq!(err.to_string(), "Directory has children, cannot change to file");
        assert!(dir.is_dir().unwrap());
    }

    #[test]
    fn empty_file_can_become_directory() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "later");
        node.chmod(Mode::dir(0o700)).unwrap();
        node.save().unwrap();
        assert!(node.is_dir().unwrap());
    }

    #[test]
    fn resize_directory_rejected() {
        let (graph, _, _) = graph();
        let mut dir = graph.create_directory(&NodeId::root(), "docs").unwrap();
        assert_eq!(dir.resize(1).unwrap_err().kind(), ErrorKind::InvalidState);
        dir.resize(0).unwrap();
    }

    #[test]
    fn touch_in_future_rejected() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        let err = node.touch(Utc::now() + Duration::hours(1)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot set modified time in the future");
    }

    #[test]
    fn mtime_keeps_nanoseconds() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        let when = DateTime::parse_from_rfc3339("2020-05-17T10:11:12.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        node.touch(when).unwrap();
        node.save().unwrap();
        assert_eq!(node.mtime().unwrap(), when);
    }

    #[test]
    fn malformed_value_reads_as_zero() {
        let (graph, store, _) = graph();
        let node = file(&graph, "a.txt");
        let mut tx = Transaction::new();
        tx.remove(Triple::new(node.id().as_str(), links::SIZE, "0"))
            .add(Triple::new(node.id().as_str(), links::SIZE, "lots"));
        store.apply(&tx).unwrap();
        assert_eq!(node.size().unwrap(), 0);
    }

    #[test]
    fn write_requires_alignment() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(3 * BLOCK_SIZE).unwrap();
        let err = node.write_data(b"x", BLOCK_SIZE + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn write_past_size_rejected() {
        let (graph, _, blocks) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(4).unwrap();
        node.save().unwrap();
        let err = node.write_data(b"hello", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(blocks.is_empty().unwrap());
    }

    #[test]
    fn write_end_overflowing_u64_rejected() {
        let (graph, store, blocks) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(10).unwrap();
        node.save().unwrap();
        let offset = u64::MAX - u64::MAX % BLOCK_SIZE;
        let data = vec![7u8; BLOCK_SIZE as usize];
        let err = node.write_data(&data, offset).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(blocks.is_empty().unwrap());
        let link = links::offset_link(offset);
        assert!(store.value_of(node.id().as_str(), &link).unwrap().is_none());
    }

    #[test]
    fn resize_bounded_by_max_size() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        assert_eq!(node.resize(u64::MAX).unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(node.resize(MAX_SIZE + 1).unwrap_err().kind(), ErrorKind::InvalidState);
        assert!(!node.has_pending_changes());

        node.resize(MAX_SIZE).unwrap();
        node.save().unwrap();
        assert_eq!(node.size().unwrap(), MAX_SIZE);

        node.resize(0).unwrap();
        node.save().unwrap();
        assert_eq!(node.size().unwrap(), 0);
    }

    #[test]
    fn sparse_file_at_max_size_lists_and_removes() {
        let (graph, store, _) = graph();
        let mut node = file(&graph, "sparse.img");
        node.resize(MAX_SIZE).unwrap();
        let far = 4096 * BLOCK_SIZE;
        let hash = node.write_data(b"tail", far).unwrap();

        assert_eq!(node.blocks().unwrap(), vec![BlockInfo::new(hash, far)]);

        graph.remove_node(&node).unwrap();
        assert!(store.facts_about(node.id().as_str()).unwrap().is_empty());
    }

    #[test]
    fn create_with_size_past_max_rejected() {
        let (graph, _, _) = graph();
        let mut info = NodeInfo::new(NodeId::root(), "huge.bin", Mode::new(0o644));
        info.size = u64::MAX;
        let err = graph.new_node_with_attributes(&info).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(graph.node_with_name(&NodeId::root(), "huge.bin").unwrap().is_none());
    }

    #[test]
    fn oversized_write_is_integrity_error() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(2 * BLOCK_SIZE).unwrap();
        let data = vec![0u8; BLOCK_SIZE as usize + 1];
        assert_eq!(
            node.write_data(&data, 0).unwrap_err().kind(),
            ErrorKind::Integrity
        );
    }

    #[test]
    fn empty_write_rejected() {
        let (graph, store, blocks) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(BLOCK_SIZE).unwrap();
        let err = node.write_data(b"", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(blocks.is_empty().unwrap());
        assert!(store.value_of(node.id().as_str(), "offset-0").unwrap().is_none());
    }

    #[test]
    fn write_to_directory_rejected() {
        let (graph, _, _) = graph();
        let mut dir = graph.create_directory(&NodeId::root(), "docs").unwrap();
        assert_eq!(
            dir.write_data(b"x", 0).unwrap_err().kind(),
            ErrorKind::InvalidState
        );
    }

    #[test]
    fn aligned_writes_list_in_order() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(2 * BLOCK_SIZE).unwrap();
        let first = vec![1u8; BLOCK_SIZE as usize];
        let second = vec![2u8; BLOCK_SIZE as usize];

        let h2 = node.write_data(&second, BLOCK_SIZE).unwrap();
        let h1 = node.write_data(&first, 0).unwrap();

        let blocks = node.blocks().unwrap();
        assert_eq!(
            blocks,
            vec![BlockInfo::new(h1, 0), BlockInfo::new(h2, BLOCK_SIZE)]
        );
        assert_eq!(node.size().unwrap(), 2 * BLOCK_SIZE);
    }

    #[test]
    fn rewrite_replaces_binding() {
        let (graph, store, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(3).unwrap();
        let old = node.write_data(b"abc", 0).unwrap();
        let new = node.write_data(b"xyz", 0).unwrap();

        assert_ne!(old, new);
        assert_eq!(node.blocks().unwrap(), vec![BlockInfo::new(new, 0)]);
        assert!(!store
            .contains(&Triple::new(node.id().as_str(), "offset-0", old.as_str()))
            .unwrap());
        assert_eq!(node.read_block(0).unwrap().unwrap(), b"xyz");
    }

    #[test]
    fn holes_are_omitted() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "sparse");
        node.resize(3 * BLOCK_SIZE).unwrap();
        let hash = node.write_data(b"tail", 2 * BLOCK_SIZE).unwrap();
        assert_eq!(
            node.blocks().unwrap(),
            vec![BlockInfo::new(hash, 2 * BLOCK_SIZE)]
        );
        assert!(node.block_with_offset(0).unwrap().is_none());
        assert!(node.read_block(BLOCK_SIZE).unwrap().is_none());
    }

    #[test]
    fn shrink_unbinds_trailing_blocks() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(2 * BLOCK_SIZE).unwrap();
        let head = node.write_data(&[7u8; 16], 0).unwrap();
        node.write_data(&[8u8; 16], BLOCK_SIZE).unwrap();

        node.resize(BLOCK_SIZE).unwrap();
        node.save().unwrap();
        assert_eq!(node.blocks().unwrap(), vec![BlockInfo::new(head, 0)]);

        node.resize(2 * BLOCK_SIZE).unwrap();
        node.save().unwrap();
        assert!(node.block_with_offset(BLOCK_SIZE).unwrap().is_none());
    }

    #[test]
    fn write_flushes_staged_resize() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.resize(5).unwrap();
        node.write_data(b"hello", 0).unwrap();
        assert!(!node.has_pending_changes());
        assert_eq!(node.size().unwrap(), 5);
    }

    #[test]
    fn directory_has_no_blocks() {
        let (graph, _, _) = graph();
        let dir = graph.create_directory(&NodeId::root(), "docs").unwrap();
        assert!(dir.blocks().unwrap().is_empty());
        assert!(dir.block_with_offset(0).unwrap().is_none());
        assert!(dir.reader().is_err());
    }

    #[test]
    fn node_info_snapshot() {
        let (graph, _, _) = graph();
        let node = file(&graph, "notes.txt");
        let info = node.node_info().unwrap();
        assert_eq!(info.id, *node.id());
        assert_eq!(info.parent_id, Some(NodeId::root()));
        assert_eq!(info.name, "notes.txt");
        assert_eq!(info.mime_type, "text/plain");
        assert_eq!(info.mode, Mode::new(0o644));
    }

    #[test]
    fn discard_changes_drops_staged_values() {
        let (graph, _, _) = graph();
        let mut node = file(&graph, "a.txt");
        node.set_name("b.txt").unwrap();
        node.set_mime_type("application/x-test");
        node.discard_changes();
        assert!(!node.has_pending_changes());
        node.save().unwrap();
        assert_eq!(node.name().unwrap(), "a.txt");
    }
}
