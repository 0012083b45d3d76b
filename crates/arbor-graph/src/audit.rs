//! Tree consistency audit.
//!
//! An [`AuditReport`] lists every invariant violation found by walking the
//! tree from the root. It also catches the one inconsistency the engine can
//! leave behind on its own: a block binding whose payload is not in the
//! block store.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use arbor_types::{BlockHash, NodeId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::GraphResult;
use crate::nodegraph::NodeGraph;

/// A single invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    RootMissing,
    RootHasParent { parent: NodeId },
    /// Listed as a child but has no name.
    NamelessNode { node: NodeId, parent: NodeId },
    /// Reached through more than one parent edge.
    ReachedTwice { node: NodeId },
    DuplicateName { parent: NodeId, name: String, nodes: Vec<NodeId> },
    DirectoryWithSize { node: NodeId, size: u64 },
    ChildrenOfFile { node: NodeId, children: usize },
    FutureMTime { node: NodeId, mtime: DateTime<Utc> },
    /// A binding whose payload is not in the block store.
    MissingBlock { node: NodeId, offset: u64, hash: BlockHash },
    /// A bound block holding bytes past the node's size.
    BlockExceedsSize { node: NodeId, offset: u64, len: u64, size: u64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootMissing => write!(f, "root node is missing"),
            Self::RootHasParent { parent } => write!(f, "root has parent {parent}"),
            Self::NamelessNode { node, parent } => {
                write!(f, "node {node} under {parent} has no name")
            }
            Self::ReachedTwice { node } => write!(f, "node {node} has more than one parent"),
            Self::DuplicateName { parent, name, nodes } => write!(
                f,
                "{} children of {parent} are named {name:?}",
                nodes.len()
            ),
            Self::DirectoryWithSize { node, size } => {
                write!(f, "directory {node} has size {size}")
            }
            Self::ChildrenOfFile { node, children } => {
                write!(f, "file {node} has {children} children")
            }
            Self::FutureMTime { node, mtime } => {
                write!(f, "node {node} modified in the future ({mtime})")
            }
            Self::MissingBlock { node, offset, hash } => {
                write!(f, "node {node} offset {offset} references missing block {hash}")
            }
            Self::BlockExceedsSize {
                node,
                offset,
                len,
                size,
            } => write!(
                f,
                "node {node} block at {offset} holds {len} bytes, past size {size}"
            ),
        }
    }
}

/// Result of [`NodeGraph::audit`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Nodes reached from the root, root included.
    pub nodes_checked: usize,
    /// Bound blocks checked against the block store.
    pub blocks_checked: usize,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

impl NodeGraph {
    /// Walk the tree breadth-first from the root and report violations.
    ///
    /// Nodes not reachable from the root are not visited.
    #[instrument(level = "debug", skip(self))]
    pub fn audit(&self) -> GraphResult<AuditReport> {
        let mut report = AuditReport::default();
        let root = self.root();
        if !root.exists()? {
            report.violations.push(Violation::RootMissing);
            return Ok(report);
        }
        if let Some(parent) = root.parent_id()? {
            report.violations.push(Violation::RootHasParent { parent });
        }

        let now = Utc::now();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            if !seen.insert(node.id().clone()) {
                report.violations.push(Violation::ReachedTwice {
                    node: node.id().clone(),
                });
                continue;
            }
            report.nodes_checked += 1;
            let id = node.id().clone();

            let mtime = node.mtime()?;
            if mtime > now {
                report.violations.push(Violation::FutureMTime { node: id.clone(), mtime });
            }

            let children = node.children()?;
            let size = node.size()?;
            if node.is_dir()? {
                if size > 0 {
                    report.violations.push(Violation::DirectoryWithSize { node: id.clone(), size });
                }
            } else {
                if !children.is_empty() {
                    report.violations.push(Violation::ChildrenOfFile {
                        node: id.clone(),
                        children: children.len(),
                    });
                }
                for block in node.blocks()? {
                    report.blocks_checked += 1;
                    if !self.block_store().exists(&block.hash)? {
                        report.violations.push(Violation::MissingBlock {
                            node: id.clone(),
                            offset: block.offset,
                            hash: block.hash,
                        });
                        continue;
                    }
                    let len = self.block_store().size_on_disk(&block.hash)?;
                    if block.offset.saturating_add(len) > size {
                        report.violations.push(Violation::BlockExceedsSize {
                            node: id.clone(),
                            offset: block.offset,
                            len,
                            size,
                        });
                    }
                }
            }

            let mut by_name: HashMap<String, Vec<NodeId>> = HashMap::new();
            for child in &children {
                let name = child.name()?;
                if name.is_empty() {
                    report.violations.push(Violation::NamelessNode {
                        node: child.id().clone(),
                        parent: id.clone(),
                    });
                    continue;
                }
                by_name.entry(name).or_default().push(child.id().clone());
            }
            let mut duplicates: Vec<_> = by_name.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
            duplicates.sort();
            for (name, nodes) in duplicates {
                report.violations.push(Violation::DuplicateName {
                    parent: id.clone(),
                    name,
                    nodes,
                });
            }

            queue.extend(children);
        }

        if report.is_clean() {
            info!(nodes = report.nodes_checked, blocks = report.blocks_checked, "audit clean");
        } else {
            warn!(
                nodes = report.nodes_checked,
                violations = report.violations.len(),
                "audit found violations"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links;
    use crate::nodegraph::testing::graph;
    use arbor_triples::{Triple, TripleStore};
    use arbor_types::Mode;

    #[test]
    fn healthy_tree_is_clean() {
        let (graph, _, _) = graph();
        let docs = graph.create_directory(&NodeId::root(), "docs").unwrap();
        let mut file = graph.new_node("a.txt", docs.id(), Mode::new(0o644)).unwrap();
        file.resize(5).unwrap();
        file.write_data(b"hello", 0).unwrap();

        let report = graph.audit().unwrap();
        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.nodes_checked, 3);
        assert_eq!(report.blocks_checked, 1);
    }

    #[test]
    fn detects_missing_block_payload() {
        let (graph, store, _) = graph();
        let file = graph.new_node("a.txt", &NodeId::root(), Mode::new(0o644)).unwrap();
        let mut tx = arbor_triples::Transaction::new();
        tx.remove(Triple::new(file.id().as_str(), links::SIZE, "0"))
            .add(Triple::new(file.id().as_str(), links::SIZE, "4"))
            .add(Triple::new(file.id().as_str(), "offset-0", "deadbeef"));
        store.apply(&tx).unwrap();

        let report = graph.audit().unwrap();
        assert_eq!(
            report.violations,
            vec![Violation::MissingBlock {
                node: file.id().clone(),
                offset: 0,
                hash: BlockHash::parse("deadbeef").unwrap(),
            }]
        );
    }

    #[test]
    fn detects_duplicate_names_and_sized_directory() {
        let (graph, store, _) = graph();
        graph.new_node("a", &NodeId::root(), Mode::new(0o644)).unwrap();
        let b = graph.new_node("b", &NodeId::root(), Mode::new(0o644)).unwrap();
        let docs = graph.create_directory(&NodeId::root(), "docs").unwrap();

        // Bypass the graph to corrupt the store directly.
        store.remove_fact(Triple::new(b.id().as_str(), links::NAME, "b")).unwrap();
        store.add_fact(Triple::new(b.id().as_str(), links::NAME, "a")).unwrap();
        store.remove_fact(Triple::new(docs.id().as_str(), links::SIZE, "0")).unwrap();
        store.add_fact(Triple::new(docs.id().as_str(), links::SIZE, "9")).unwrap();

        let report = graph.audit().unwrap();
        assert!(report.violations.contains(&Violation::DirectoryWithSize {
            node: docs.id().clone(),
            size: 9,
        }));
        let duplicate = report
            .violations
            .iter()
            .find_map(|v| match v {
                Violation::DuplicateName { name, nodes, .. } => Some((name.clone(), nodes.len())),
                _ => None,
            })
            .unwrap();
        assert_eq!(duplicate, ("a".to_string(), 2));
    }

    #[test]
    fn report_serializes_with_kind_tag() {
        let report = AuditReport {
            nodes_checked: 1,
            blocks_checked: 0,
            violations: vec![Violation::RootMissing],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["violations"][0]["kind"], "root_missing");
    }
}
