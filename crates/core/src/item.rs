//! Catalog items
//!
//! An item is a named, long-lived entity identified by a user-chosen source
//! key and a generated id. It owns one version-history DAG and a set of
//! item-level tags. The six kinds share a common base record; only edge
//! items carry extra fields (the two node items they connect, fixed at
//! creation).
//!
//! Items are mutable only in the sense that their DAG accretes versions:
//! name, source key, endpoints, and item-level tags are all fixed at
//! creation time.

use crate::tag::Tag;
use crate::types::{ItemId, ItemKind};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// The base record every item kind shares.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCore {
    /// Generated id, unique across all items
    pub id: ItemId,
    /// User-chosen key, unique per item kind
    pub source_key: String,
    /// Human-readable name
    pub name: String,
    /// Item-level tags, independent from any version's tags
    pub tags: BTreeMap<String, Tag>,
}

impl ItemCore {
    /// Create a base record
    pub fn new(
        id: ItemId,
        source_key: impl Into<String>,
        name: impl Into<String>,
        tags: BTreeMap<String, Tag>,
    ) -> Self {
        Self {
            id,
            source_key: source_key.into(),
            name: name.into(),
            tags,
        }
    }
}

/// An edge item: the base record plus its two fixed node endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeItem {
    /// Shared base record
    pub core: ItemCore,
    /// Id of the originating node item
    pub from_node_id: ItemId,
    /// Id of the destination node item
    pub to_node_id: ItemId,
}

/// A catalog item of one of the six kinds.
///
/// This is the closed tagged-variant form of the item family: one shared
/// base record, kind-specific fields where a kind has any, and free
/// functions/methods dispatching on the kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A plain node
    Node(ItemCore),
    /// An edge between two nodes
    Edge(EdgeItem),
    /// A graph
    Graph(ItemCore),
    /// A structure (tag schema container)
    Structure(ItemCore),
    /// A lineage edge
    LineageEdge(ItemCore),
    /// A lineage graph
    LineageGraph(ItemCore),
}

impl Item {
    /// The shared base record
    pub fn core(&self) -> &ItemCore {
        match self {
            Item::Node(core)
            | Item::Graph(core)
            | Item::Structure(core)
            | Item::LineageEdge(core)
            | Item::LineageGraph(core) => core,
            Item::Edge(edge) => &edge.core,
        }
    }

    /// The kind discriminator
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Node(_) => ItemKind::Node,
            Item::Edge(_) => ItemKind::Edge,
            Item::Graph(_) => ItemKind::Graph,
            Item::Structure(_) => ItemKind::Structure,
            Item::LineageEdge(_) => ItemKind::LineageEdge,
            Item::LineageGraph(_) => ItemKind::LineageGraph,
        }
    }

    /// Generated id
    pub fn id(&self) -> ItemId {
        self.core().id
    }

    /// User-chosen source key
    pub fn source_key(&self) -> &str {
        &self.core().source_key
    }

    /// Human-readable name
    pub fn name(&self) -> &str {
        &self.core().name
    }

    /// Item-level tags
    pub fn tags(&self) -> &BTreeMap<String, Tag> {
        &self.core().tags
    }

    /// Edge view, if this item is an edge
    pub fn as_edge(&self) -> Option<&EdgeItem> {
        match self {
            Item::Edge(edge) => Some(edge),
            _ => None,
        }
    }
}

/// Flat wire form: base fields plus endpoint fields for edges.
impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let core = self.core();
        match self {
            Item::Edge(edge) => {
                let mut state = serializer.serialize_struct("Item", 6)?;
                state.serialize_field("id", &core.id)?;
                state.serialize_field("sourceKey", &core.source_key)?;
                state.serialize_field("name", &core.name)?;
                state.serialize_field("tags", &core.tags)?;
                state.serialize_field("fromNodeId", &edge.from_node_id)?;
                state.serialize_field("toNodeId", &edge.to_node_id)?;
                state.end()
            }
            _ => {
                let mut state = serializer.serialize_struct("Item", 4)?;
                state.serialize_field("id", &core.id)?;
                state.serialize_field("sourceKey", &core.source_key)?;
                state.serialize_field("name", &core.name)?;
                state.serialize_field("tags", &core.tags)?;
                state.end()
            }
        }
    }
}
