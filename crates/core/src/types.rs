//! Core identifier and key types for the loam catalog
//!
//! This module defines the foundational types:
//! - Id aliases: `ItemId`, `VersionId`, `SuccessorId` (opaque u64s)
//! - `ItemKind`: discriminator for the closed set of catalog entity kinds
//! - `RecordKind`: type tag for discriminating row kinds in unified storage
//! - `CatalogKey`: composite key (record kind + user key bytes)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an Item (a named, long-lived catalog entity).
pub type ItemId = u64;

/// Identifier of a Version (an immutable snapshot owned by an Item).
pub type VersionId = u64;

/// Identifier of a VersionSuccessor (one directed DAG edge).
pub type SuccessorId = u64;

/// Reserved sentinel meaning "no parent version" — the root of every DAG.
///
/// The id generator never issues `0`, so the sentinel can never collide
/// with a real version.
pub const ROOT_VERSION: VersionId = 0;

/// The closed set of catalog entity kinds.
///
/// Source keys are unique *per kind*: a node and an edge may share a source
/// key, two nodes may not. The kind also scopes storage rows so that each
/// kind behaves like its own table.
///
/// These byte values are part of the storage key format and MUST NOT change:
/// - Node = 0x01
/// - Edge = 0x02
/// - Graph = 0x03
/// - Structure = 0x04
/// - LineageEdge = 0x05
/// - LineageGraph = 0x06
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ItemKind {
    /// A plain node in the catalog graph
    Node = 0x01,
    /// An edge item binding two node items
    Edge = 0x02,
    /// A graph item whose versions aggregate edge versions
    Graph = 0x03,
    /// A structure item whose versions declare required tag schemas
    Structure = 0x04,
    /// A lineage edge between two rich versions
    LineageEdge = 0x05,
    /// A lineage graph aggregating lineage edge versions
    LineageGraph = 0x06,
}

impl ItemKind {
    /// Convert to byte representation
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Try to create from byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ItemKind::Node),
            0x02 => Some(ItemKind::Edge),
            0x03 => Some(ItemKind::Graph),
            0x04 => Some(ItemKind::Structure),
            0x05 => Some(ItemKind::LineageEdge),
            0x06 => Some(ItemKind::LineageGraph),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Node => "node",
            ItemKind::Edge => "edge",
            ItemKind::Graph => "graph",
            ItemKind::Structure => "structure",
            ItemKind::LineageEdge => "lineage edge",
            ItemKind::LineageGraph => "lineage graph",
        };
        write!(f, "{}", name)
    }
}

/// Which tag table a tag lives in.
///
/// Item-level and version-level tags are logically separate namespaces:
/// a reverse lookup by key over one never sees owners from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagDomain {
    /// Tags attached to an Item
    Item,
    /// Tags attached to a RichVersion
    Version,
}

/// Type tag for discriminating row kinds in unified storage
///
/// The storage layer is one ordered key space; `RecordKind` plays the role
/// a table name plays in a relational adapter. Values are part of the key
/// format and MUST NOT change.
///
/// Ordering: rows of one kind are contiguous, so a prefix scan over a kind
/// behaves like a table scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RecordKind {
    /// Item rows, keyed by (item kind, item id)
    Item = 0x01,
    /// Source-key index rows, keyed by (item kind, source key) → item id
    SourceKeyIndex = 0x02,
    /// Version rows, keyed by version id
    Version = 0x03,
    /// Version-successor rows, keyed by successor id
    Successor = 0x04,
    /// DAG membership rows, keyed by (item id, successor id)
    DagEdge = 0x05,
    /// Item-level tag rows, keyed by (owner id, tag key)
    ItemTag = 0x06,
    /// Version-level tag rows, keyed by (owner id, tag key)
    VersionTag = 0x07,
    /// Reverse index for item tags, keyed by (tag key, owner id)
    ItemTagIndex = 0x08,
    /// Reverse index for version tags, keyed by (tag key, owner id)
    VersionTagIndex = 0x09,
    /// Node-version adjacency rows, keyed by (node version id, edge version id)
    Adjacency = 0x0a,
}

impl RecordKind {
    /// Convert to byte representation
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Try to create from byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(RecordKind::Item),
            0x02 => Some(RecordKind::SourceKeyIndex),
            0x03 => Some(RecordKind::Version),
            0x04 => Some(RecordKind::Successor),
            0x05 => Some(RecordKind::DagEdge),
            0x06 => Some(RecordKind::ItemTag),
            0x07 => Some(RecordKind::VersionTag),
            0x08 => Some(RecordKind::ItemTagIndex),
            0x09 => Some(RecordKind::VersionTagIndex),
            0x0a => Some(RecordKind::Adjacency),
            _ => None,
        }
    }

    /// Tag row kind for a tag domain
    pub fn tag_table(domain: TagDomain) -> Self {
        match domain {
            TagDomain::Item => RecordKind::ItemTag,
            TagDomain::Version => RecordKind::VersionTag,
        }
    }

    /// Reverse-index row kind for a tag domain
    pub fn tag_index(domain: TagDomain) -> Self {
        match domain {
            TagDomain::Item => RecordKind::ItemTagIndex,
            TagDomain::Version => RecordKind::VersionTagIndex,
        }
    }
}

/// Unified key for all storage row kinds
///
/// A `CatalogKey` combines a record kind with user key bytes. Keys are
/// ordered by kind, then user key, so all rows of a kind are grouped and
/// prefix scans within a kind are cheap.
///
/// Ids are encoded big-endian so lexicographic order equals numeric order.
/// Composite keys that mix a string component with an id use a null-byte
/// separator, ensuring a prefix scan on the string component never bleeds
/// into a longer string that shares the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    /// Row-kind discriminator
    pub kind: RecordKind,
    /// Row key bytes within the kind
    pub user_key: Vec<u8>,
}

impl CatalogKey {
    /// Create a key with the given kind and raw user key
    pub fn new(kind: RecordKind, user_key: Vec<u8>) -> Self {
        Self { kind, user_key }
    }

    /// Key of an item row
    pub fn item(kind: ItemKind, id: ItemId) -> Self {
        let mut user_key = Vec::with_capacity(9);
        user_key.push(kind.as_byte());
        user_key.extend_from_slice(&id.to_be_bytes());
        Self::new(RecordKind::Item, user_key)
    }

    /// Key of a source-key index row
    pub fn source_key(kind: ItemKind, source_key: &str) -> Self {
        let mut user_key = Vec::with_capacity(1 + source_key.len());
        user_key.push(kind.as_byte());
        user_key.extend_from_slice(source_key.as_bytes());
        Self::new(RecordKind::SourceKeyIndex, user_key)
    }

    /// Key of a version row
    pub fn version(id: VersionId) -> Self {
        Self::new(RecordKind::Version, id.to_be_bytes().to_vec())
    }

    /// Key of a version-successor row
    pub fn successor(id: SuccessorId) -> Self {
        Self::new(RecordKind::Successor, id.to_be_bytes().to_vec())
    }

    /// Key of a DAG membership row
    pub fn dag_edge(item_id: ItemId, successor_id: SuccessorId) -> Self {
        let mut user_key = Vec::with_capacity(16);
        user_key.extend_from_slice(&item_id.to_be_bytes());
        user_key.extend_from_slice(&successor_id.to_be_bytes());
        Self::new(RecordKind::DagEdge, user_key)
    }

    /// Prefix matching every DAG membership row of one item
    pub fn dag_prefix(item_id: ItemId) -> Self {
        Self::new(RecordKind::DagEdge, item_id.to_be_bytes().to_vec())
    }

    /// Key of a tag row
    pub fn tag(domain: TagDomain, owner_id: u64, key: &str) -> Self {
        let mut user_key = Vec::with_capacity(9 + key.len());
        user_key.extend_from_slice(&owner_id.to_be_bytes());
        user_key.push(0); // null separator
        user_key.extend_from_slice(key.as_bytes());
        Self::new(RecordKind::tag_table(domain), user_key)
    }

    /// Prefix matching every tag row of one owner
    pub fn tag_prefix(domain: TagDomain, owner_id: u64) -> Self {
        let mut user_key = Vec::with_capacity(9);
        user_key.extend_from_slice(&owner_id.to_be_bytes());
        user_key.push(0);
        Self::new(RecordKind::tag_table(domain), user_key)
    }

    /// Key of a reverse tag-index row
    ///
    /// Key format: `{tag_key}\0{owner_id_be_bytes}`. The null separator
    /// ensures a scan for key `x` does not match key `xy`; big-endian owner
    /// bytes keep results in owner-id order.
    pub fn tag_index(domain: TagDomain, key: &str, owner_id: u64) -> Self {
        let mut user_key = Vec::with_capacity(key.len() + 9);
        user_key.extend_from_slice(key.as_bytes());
        user_key.push(0);
        user_key.extend_from_slice(&owner_id.to_be_bytes());
        Self::new(RecordKind::tag_index(domain), user_key)
    }

    /// Prefix matching every reverse tag-index row for one tag key
    pub fn tag_index_prefix(domain: TagDomain, key: &str) -> Self {
        let mut user_key = Vec::with_capacity(key.len() + 1);
        user_key.extend_from_slice(key.as_bytes());
        user_key.push(0);
        Self::new(RecordKind::tag_index(domain), user_key)
    }

    /// Key of a node-version adjacency row
    pub fn adjacency(node_version_id: VersionId, edge_version_id: VersionId) -> Self {
        let mut user_key = Vec::with_capacity(16);
        user_key.extend_from_slice(&node_version_id.to_be_bytes());
        user_key.extend_from_slice(&edge_version_id.to_be_bytes());
        Self::new(RecordKind::Adjacency, user_key)
    }

    /// Prefix matching every adjacency row of one node version
    pub fn adjacency_prefix(node_version_id: VersionId) -> Self {
        Self::new(RecordKind::Adjacency, node_version_id.to_be_bytes().to_vec())
    }

    /// Check if this key starts with the given prefix
    ///
    /// For a key to match, kind must be equal and the user key must start
    /// with the prefix's user key. This is what makes prefix scans over the
    /// ordered key space behave like table scans.
    pub fn starts_with(&self, prefix: &CatalogKey) -> bool {
        self.kind == prefix.kind && self.user_key.starts_with(&prefix.user_key)
    }

    /// Decode the trailing 8 bytes of the user key as a big-endian id
    ///
    /// Composite keys end with an id component (DAG membership, tag index,
    /// adjacency); this recovers it during a prefix scan.
    pub fn trailing_id(&self) -> Option<u64> {
        if self.user_key.len() < 8 {
            return None;
        }
        let tail = &self.user_key[self.user_key.len() - 8..];
        let bytes: [u8; 8] = tail.try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }
}

/// Ordering: kind → user_key, so rows of one kind are contiguous and a
/// prefix scan can terminate at the first non-matching key.
impl Ord for CatalogKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.user_key.cmp(&other.user_key))
    }
}

impl PartialOrd for CatalogKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
