//! Version successor edges

use crate::types::{SuccessorId, VersionId, ROOT_VERSION};
use serde::{Deserialize, Serialize};

/// One directed edge `{from_id → to_id}` in an item's version DAG.
///
/// `from_id` is either the root sentinel `0` or the id of an existing
/// version; `to_id` is always a real version id. Successors are created
/// exactly once when a child version is attached to an item, and deleted
/// only by truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSuccessor {
    /// Generated id of this edge
    pub id: SuccessorId,
    /// Parent version id, or `0` for the DAG root
    pub from_id: VersionId,
    /// Child version id, never `0`
    pub to_id: VersionId,
}

impl VersionSuccessor {
    /// Create a successor edge
    pub fn new(id: SuccessorId, from_id: VersionId, to_id: VersionId) -> Self {
        debug_assert_ne!(to_id, ROOT_VERSION, "the root sentinel can never be a child");
        Self { id, from_id, to_id }
    }

    /// True if this edge hangs its child directly off the root sentinel
    pub fn is_root_edge(&self) -> bool {
        self.from_id == ROOT_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_edge_detection() {
        assert!(VersionSuccessor::new(1, 0, 5).is_root_edge());
        assert!(!VersionSuccessor::new(2, 5, 6).is_root_edge());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let edge = VersionSuccessor::new(3, 1, 2);
        let json = serde_json::to_value(edge).unwrap();
        assert_eq!(json, serde_json::json!({"id": 3, "fromId": 1, "toId": 2}));
    }
}
