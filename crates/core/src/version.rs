//! Versions: immutable, identified snapshots
//!
//! A version is never mutated in place, only superseded by a new version
//! linked through a successor edge. `RichVersion` is the base record most
//! version kinds share: tags, an optional structure-conformance reference,
//! and an optional external reference with access parameters. Structure
//! versions are the exception — they carry a schema instead of rich content.
//!
//! The one sanctioned mutation is closing an edge version's endpoint
//! interval (see the catalog's endpoint maintenance): the stored record is
//! rewritten, but the version's identity and lineage never change.

use crate::error::{Error, Result, Violation};
use crate::tag::{Tag, ValueType};
use crate::types::{ItemId, ItemKind, VersionId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Base record for versions that carry rich content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichVersion {
    /// Generated id, unique across all versions
    pub id: VersionId,
    /// Version-level tags, keyed by tag key
    pub tags: BTreeMap<String, Tag>,
    /// Structure version this version declares conformance to, if any
    pub structure_version_id: Option<VersionId>,
    /// External reference (a URI), if any
    pub reference: Option<String>,
    /// Access parameters for `reference`; meaningful only when it is present
    pub parameters: BTreeMap<String, String>,
}

impl RichVersion {
    /// Create a rich version record
    pub fn new(
        id: VersionId,
        tags: BTreeMap<String, Tag>,
        structure_version_id: Option<VersionId>,
        reference: Option<String>,
        parameters: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id,
            tags,
            structure_version_id,
            reference,
            parameters,
        }
    }
}

/// A version of a node item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeVersion {
    /// Shared rich content
    #[serde(flatten)]
    pub rich: RichVersion,
    /// The node item this version belongs to
    pub node_id: ItemId,
}

/// A version of an edge item.
///
/// Besides connecting a specific version of each endpoint node, an edge
/// version records for each endpoint the `[start, end]` interval of node
/// versions it is valid for. An absent end id means the interval is still
/// open at the newest known version of that node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeVersion {
    /// Shared rich content
    #[serde(flatten)]
    pub rich: RichVersion,
    /// The edge item this version belongs to
    pub edge_id: ItemId,
    /// First "from"-node version this edge version is valid for
    pub from_node_version_start_id: VersionId,
    /// Last "from"-node version this edge version is valid for, if closed
    pub from_node_version_end_id: Option<VersionId>,
    /// First "to"-node version this edge version is valid for
    pub to_node_version_start_id: VersionId,
    /// Last "to"-node version this edge version is valid for, if closed
    pub to_node_version_end_id: Option<VersionId>,
}

/// A version of a graph item: an aggregation of edge versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphVersion {
    /// Shared rich content
    #[serde(flatten)]
    pub rich: RichVersion,
    /// The graph item this version belongs to
    pub graph_id: ItemId,
    /// Edge versions composing this graph version
    pub edge_version_ids: Vec<VersionId>,
}

/// A version of a structure item: a named tag schema.
///
/// Structure versions are referenced by other rich versions rather than
/// owning rich content of their own.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureVersion {
    /// Generated id
    pub id: VersionId,
    /// The structure item this version belongs to
    pub structure_id: ItemId,
    /// Required tag keys and their declared types
    pub attributes: BTreeMap<String, ValueType>,
}

impl StructureVersion {
    /// Check a candidate tag set against this schema.
    ///
    /// Every declared attribute must be present as a tag carrying a typed
    /// value of exactly the declared type. Extra tags beyond the declared
    /// set pass through untouched. The first failing key is reported.
    pub fn check_conformance(&self, tags: &BTreeMap<String, Tag>) -> Result<()> {
        for (key, expected) in &self.attributes {
            let tag = tags.get(key).ok_or_else(|| Error::StructureViolation {
                key: key.clone(),
                violation: Violation::MissingTag,
            })?;
            let actual = tag.value_type().ok_or_else(|| Error::StructureViolation {
                key: key.clone(),
                violation: Violation::UntypedTag,
            })?;
            if actual != *expected {
                return Err(Error::StructureViolation {
                    key: key.clone(),
                    violation: Violation::WrongType {
                        expected: *expected,
                        actual,
                    },
                });
            }
        }
        Ok(())
    }
}

/// A version of a lineage edge: a derivation link between two rich versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEdgeVersion {
    /// Shared rich content
    #[serde(flatten)]
    pub rich: RichVersion,
    /// The lineage edge item this version belongs to
    pub lineage_edge_id: ItemId,
    /// Source rich version of the derivation
    pub from_rich_version_id: VersionId,
    /// Target rich version of the derivation
    pub to_rich_version_id: VersionId,
}

/// A version of a lineage graph: an aggregation of lineage edge versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageGraphVersion {
    /// Shared rich content
    #[serde(flatten)]
    pub rich: RichVersion,
    /// The lineage graph item this version belongs to
    pub lineage_graph_id: ItemId,
    /// Lineage edge versions composing this graph version
    pub lineage_edge_version_ids: Vec<VersionId>,
}

/// A stored version of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VersionRecord {
    /// Node version
    Node(NodeVersion),
    /// Edge version
    Edge(EdgeVersion),
    /// Graph version
    Graph(GraphVersion),
    /// Structure version
    Structure(StructureVersion),
    /// Lineage edge version
    LineageEdge(LineageEdgeVersion),
    /// Lineage graph version
    LineageGraph(LineageGraphVersion),
}

impl VersionRecord {
    /// The version id
    pub fn id(&self) -> VersionId {
        match self {
            VersionRecord::Node(v) => v.rich.id,
            VersionRecord::Edge(v) => v.rich.id,
            VersionRecord::Graph(v) => v.rich.id,
            VersionRecord::Structure(v) => v.id,
            VersionRecord::LineageEdge(v) => v.rich.id,
            VersionRecord::LineageGraph(v) => v.rich.id,
        }
    }

    /// The kind of item this version belongs to
    pub fn kind(&self) -> ItemKind {
        match self {
            VersionRecord::Node(_) => ItemKind::Node,
            VersionRecord::Edge(_) => ItemKind::Edge,
            VersionRecord::Graph(_) => ItemKind::Graph,
            VersionRecord::Structure(_) => ItemKind::Structure,
            VersionRecord::LineageEdge(_) => ItemKind::LineageEdge,
            VersionRecord::LineageGraph(_) => ItemKind::LineageGraph,
        }
    }

    /// The rich content, for the five kinds that carry it
    pub fn rich(&self) -> Option<&RichVersion> {
        match self {
            VersionRecord::Node(v) => Some(&v.rich),
            VersionRecord::Edge(v) => Some(&v.rich),
            VersionRecord::Graph(v) => Some(&v.rich),
            VersionRecord::Structure(_) => None,
            VersionRecord::LineageEdge(v) => Some(&v.rich),
            VersionRecord::LineageGraph(v) => Some(&v.rich),
        }
    }
}
