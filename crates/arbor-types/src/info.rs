use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::mode::Mode;

/// Attribute snapshot of a node.
///
/// Produced by the graph on request and consumed by listing and creation
/// payloads. Field names serialize in PascalCase (`Id`, `ParentId`, `Name`,
/// `Size`, `MTime`, `Mode`, `Type`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeInfo {
    pub id: NodeId,
    /// `None` only for the root.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "MTime", default)]
    pub mtime: DateTime<Utc>,
    #[serde(default)]
    pub mode: Mode,
    /// MIME type; empty when unknown.
    #[serde(rename = "Type", default)]
    pub mime_type: String,
}

impl NodeInfo {
    /// A creation request for a child of `parent_id`.
    ///
    /// The id is a placeholder: the graph allocates the real id on create.
    pub fn new(parent_id: NodeId, name: impl Into<String>, mode: Mode) -> Self {
        Self {
            id: NodeId::generate(),
            parent_id: Some(parent_id),
            name: name.into(),
            size: 0,
            mtime: Utc::now(),
            mode,
            mime_type: String::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_pascal_case_keys() {
        let info = NodeInfo::new(NodeId::root(), "a.txt", Mode::new(0o644));
        let json = serde_json::to_value(&info).unwrap();
        for key in ["Id", "ParentId", "Name", "Size", "MTime", "Mode", "Type"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["ParentId"], "rootNode");
        assert_eq!(json["Mode"], 0o644);
    }

    #[test]
    fn deserializes_sparse_payload() {
        let info: NodeInfo =
            serde_json::from_str(r#"{"Id":"x","Name":"docs","Mode":2147484141}"#).unwrap();
        assert!(info.is_dir());
        assert_eq!(info.parent_id, None);
        assert_eq!(info.size, 0);
        assert_eq!(info.mtime, DateTime::<Utc>::default());
        assert!(info.mime_type.is_empty());
    }
}
