//! Predicate names: the wire format between the graph and the triple store.
//!
//! These strings are persisted in every fact. Renaming one makes existing
//! stores unreadable.

pub const PARENT: &str = "hasParent";
pub const NAME: &str = "isNamed";
pub const MODE: &str = "modeLink";
pub const MTIME: &str = "hasMTime";
pub const SIZE: &str = "hasSize";
pub const TYPE: &str = "hasType";

/// The predicate binding a block hash to a byte offset, e.g. `offset-1048576`.
pub fn offset_link(offset: u64) -> String {
    format!("offset-{offset}")
}

/// The offset named by a block-binding predicate.
pub fn parse_offset_link(predicate: &str) -> Option<u64> {
    predicate.strip_prefix("offset-")?.parse().ok()
}
