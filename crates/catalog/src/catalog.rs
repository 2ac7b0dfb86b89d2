//! The catalog facade
//!
//! `Catalog` orchestrates item creation, version attachment, conformance
//! checking, DAG queries, and truncation over one storage adapter. It
//! exposes the narrow factory-style API per entity kind that a controller
//! layer builds on.
//!
//! ## Unit of work
//!
//! Every operation validates first, then commits all of its statements as
//! one batch. Validation errors therefore never leave partial writes
//! behind; a storage failure aborts the whole unit.
//!
//! ## Concurrency
//!
//! Version attachment and truncation are read-modify-write sequences over
//! an item's DAG. The catalog serializes them per item with a mutex
//! registry: operations on different items run fully concurrently,
//! operations on one item queue up. Endpoint-interval maintenance reads
//! other items' DAGs without locking them; those reads are point-in-time
//! per the unit-of-work rules.

use crate::config::CatalogConfig;
use crate::dag::DagStore;
use crate::edges;
use crate::ids::IdGenerator;
use crate::items::ItemStore;
use crate::tags::TagStore;
use crate::versions::{RichVersionInput, VersionStore};
use dashmap::DashMap;
use loam_core::{
    Batch, CatalogKey, EdgeItem, EdgeVersion, Error, GraphVersion, Item, ItemCore, ItemId,
    ItemKind, LineageEdgeVersion, LineageGraphVersion, NodeVersion, Result, Store,
    StructureVersion, Tag, TagDomain, ValueType, VersionId, VersionRecord,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// The versioned-metadata catalog.
///
/// # Example
///
/// ```
/// use loam_catalog::{Catalog, RichVersionInput};
/// use loam_storage::MemoryStore;
/// use std::sync::Arc;
///
/// let catalog = Catalog::new(Arc::new(MemoryStore::new()));
/// let node = catalog.create_node("Users", "users", Default::default()).unwrap();
/// let v1 = catalog
///     .create_node_version(node.id(), RichVersionInput::new(), &[])
///     .unwrap();
/// assert_eq!(
///     catalog.leaves(loam_core::ItemKind::Node, "users").unwrap(),
///     vec![v1.rich.id]
/// );
/// ```
pub struct Catalog {
    store: Arc<dyn Store>,
    ids: Arc<IdGenerator>,
    items: ItemStore,
    versions: VersionStore,
    dags: DagStore,
    tags: TagStore,
    item_locks: DashMap<ItemId, Arc<Mutex<()>>>,
}

impl Catalog {
    /// Open a catalog over a storage adapter with default configuration.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_ids(store, Arc::new(IdGenerator::default()))
    }

    /// Open a catalog with explicit configuration.
    ///
    /// # Errors
    /// Fails if the configuration is invalid.
    pub fn with_config(store: Arc<dyn Store>, config: &CatalogConfig) -> Result<Self> {
        config.validate()?;
        let ids = Arc::new(IdGenerator::new(config.machine_id, config.machine_count)?);
        Ok(Self::with_ids(store, ids))
    }

    fn with_ids(store: Arc<dyn Store>, ids: Arc<IdGenerator>) -> Self {
        let items = ItemStore::new(store.clone());
        let versions = VersionStore::new(store.clone());
        let dags = DagStore::new(store.clone(), ids.clone());
        let tags = TagStore::new(store.clone());
        Self {
            store,
            ids,
            items,
            versions,
            dags,
            tags,
            item_locks: DashMap::new(),
        }
    }

    fn item_lock(&self, item_id: ItemId) -> Arc<Mutex<()>> {
        self.item_locks
            .entry(item_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ====================================================================
    // Item creation
    // ====================================================================

    fn create_item(&self, item: Item) -> Result<Item> {
        let batch = self.items.insert_statements(&item)?;
        self.store.apply(batch)?;
        info!(
            kind = %item.kind(),
            source_key = item.source_key(),
            id = item.id(),
            "created item"
        );
        Ok(item)
    }

    fn plain_core(&self, name: &str, source_key: &str, tags: BTreeMap<String, Tag>) -> ItemCore {
        let id = self.ids.next_id();
        ItemCore::new(id, source_key, name, own_tags(id, tags))
    }

    /// Create a node item.
    ///
    /// # Errors
    /// `DuplicateItem` if the source key is taken.
    pub fn create_node(
        &self,
        name: &str,
        source_key: &str,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        self.create_item(Item::Node(self.plain_core(name, source_key, tags)))
    }

    /// Create an edge item binding two existing nodes.
    ///
    /// # Errors
    /// `ItemNotFound` if either endpoint node does not exist,
    /// `DuplicateItem` if the source key is taken.
    pub fn create_edge(
        &self,
        name: &str,
        source_key: &str,
        from_node_id: ItemId,
        to_node_id: ItemId,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        self.items.by_id(ItemKind::Node, from_node_id)?;
        self.items.by_id(ItemKind::Node, to_node_id)?;
        self.create_item(Item::Edge(EdgeItem {
            core: self.plain_core(name, source_key, tags),
            from_node_id,
            to_node_id,
        }))
    }

    /// Create a graph item.
    ///
    /// # Errors
    /// `DuplicateItem` if the source key is taken.
    pub fn create_graph(
        &self,
        name: &str,
        source_key: &str,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        self.create_item(Item::Graph(self.plain_core(name, source_key, tags)))
    }

    /// Create a structure item.
    ///
    /// # Errors
    /// `DuplicateItem` if the source key is taken.
    pub fn create_structure(
        &self,
        name: &str,
        source_key: &str,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        self.create_item(Item::Structure(self.plain_core(name, source_key, tags)))
    }

    /// Create a lineage edge item.
    ///
    /// # Errors
    /// `DuplicateItem` if the source key is taken.
    pub fn create_lineage_edge(
        &self,
        name: &str,
        source_key: &str,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        self.create_item(Item::LineageEdge(self.plain_core(name, source_key, tags)))
    }

    /// Create a lineage graph item.
    ///
    /// # Errors
    /// `DuplicateItem` if the source key is taken.
    pub fn create_lineage_graph(
        &self,
        name: &str,
        source_key: &str,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        self.create_item(Item::LineageGraph(self.plain_core(name, source_key, tags)))
    }

    // ====================================================================
    // Item retrieval
    // ====================================================================

    /// Look up an item by kind and source key.
    ///
    /// # Errors
    /// `ItemNotFound` if no item matches.
    pub fn item(&self, kind: ItemKind, source_key: &str) -> Result<Item> {
        self.items.by_source_key(kind, source_key)
    }

    /// Look up an item by kind and id.
    ///
    /// # Errors
    /// `ItemNotFound` if no item matches.
    pub fn item_by_id(&self, kind: ItemKind, id: ItemId) -> Result<Item> {
        self.items.by_id(kind, id)
    }

    /// Node lookup by source key
    ///
    /// # Errors
    /// `ItemNotFound` if no node matches.
    pub fn node(&self, source_key: &str) -> Result<Item> {
        self.item(ItemKind::Node, source_key)
    }

    /// Edge lookup by source key
    ///
    /// # Errors
    /// `ItemNotFound` if no edge matches.
    pub fn edge(&self, source_key: &str) -> Result<Item> {
        self.item(ItemKind::Edge, source_key)
    }

    /// Graph lookup by source key
    ///
    /// # Errors
    /// `ItemNotFound` if no graph matches.
    pub fn graph(&self, source_key: &str) -> Result<Item> {
        self.item(ItemKind::Graph, source_key)
    }

    /// Structure lookup by source key
    ///
    /// # Errors
    /// `ItemNotFound` if no structure matches.
    pub fn structure(&self, source_key: &str) -> Result<Item> {
        self.item(ItemKind::Structure, source_key)
    }

    /// Lineage edge lookup by source key
    ///
    /// # Errors
    /// `ItemNotFound` if no lineage edge matches.
    pub fn lineage_edge(&self, source_key: &str) -> Result<Item> {
        self.item(ItemKind::LineageEdge, source_key)
    }

    /// Lineage graph lookup by source key
    ///
    /// # Errors
    /// `ItemNotFound` if no lineage graph matches.
    pub fn lineage_graph(&self, source_key: &str) -> Result<Item> {
        self.item(ItemKind::LineageGraph, source_key)
    }

    // ====================================================================
    // Version creation
    // ====================================================================

    /// Statements inserting a version and attaching it under its parents.
    /// Caller must hold the item's lock.
    fn version_batch(
        &self,
        item_id: ItemId,
        record: &VersionRecord,
        parent_ids: &[VersionId],
    ) -> Result<Batch> {
        let mut batch = self.versions.insert_statements(record)?;
        let mut dag = self.dags.retrieve(item_id)?;
        batch.merge(self.dags.update(&mut dag, record.id(), parent_ids)?);
        Ok(batch)
    }

    fn attach_version(
        &self,
        item_id: ItemId,
        record: &VersionRecord,
        parent_ids: &[VersionId],
    ) -> Result<()> {
        let lock = self.item_lock(item_id);
        let _guard = lock.lock();
        let batch = self.version_batch(item_id, record, parent_ids)?;
        self.store.apply(batch)?;
        debug!(item = item_id, version = record.id(), "created version");
        Ok(())
    }

    /// Create a new version of a node.
    ///
    /// # Errors
    /// `ItemNotFound` if the node does not exist, `InvalidParent` if a
    /// declared parent is not in its DAG, `StructureViolation` if the tags
    /// fail conformance.
    pub fn create_node_version(
        &self,
        node_id: ItemId,
        input: RichVersionInput,
        parent_ids: &[VersionId],
    ) -> Result<NodeVersion> {
        self.items.by_id(ItemKind::Node, node_id)?;
        let version = NodeVersion {
            rich: input.into_rich(self.ids.next_id()),
            node_id,
        };
        self.attach_version(node_id, &VersionRecord::Node(version.clone()), parent_ids)?;
        Ok(version)
    }

    /// Create a new version of an edge.
    ///
    /// The new version starts with open endpoint intervals at the given
    /// start ids. For each non-root parent, any still-open interval is
    /// closed where the corresponding node advanced (see the module docs of
    /// `edges`).
    ///
    /// # Errors
    /// `ItemNotFound`, `InvalidParent`, or `StructureViolation` as for
    /// other kinds; `InvalidOperation` if a start id's predecessor in the
    /// node DAG is missing or ambiguous.
    pub fn create_edge_version(
        &self,
        edge_id: ItemId,
        input: RichVersionInput,
        from_node_version_start_id: VersionId,
        to_node_version_start_id: VersionId,
        parent_ids: &[VersionId],
    ) -> Result<EdgeVersion> {
        let item = self.items.by_id(ItemKind::Edge, edge_id)?;
        let edge = item
            .as_edge()
            .ok_or_else(|| Error::Storage(format!("edge row {} holds a non-edge item", edge_id)))?;
        let version = EdgeVersion {
            rich: input.into_rich(self.ids.next_id()),
            edge_id,
            from_node_version_start_id,
            from_node_version_end_id: None,
            to_node_version_start_id,
            to_node_version_end_id: None,
        };
        let record = VersionRecord::Edge(version.clone());

        let lock = self.item_lock(edge_id);
        let _guard = lock.lock();
        let mut batch = self.version_batch(edge_id, &record, parent_ids)?;
        batch.merge(edges::close_parent_intervals(
            &self.versions,
            &self.dags,
            edge,
            &version,
            parent_ids,
        )?);
        self.store.apply(batch)?;
        debug!(item = edge_id, version = version.rich.id, "created edge version");
        Ok(version)
    }

    /// Create a new version of a graph from its member edge versions.
    ///
    /// # Errors
    /// As for [`Catalog::create_node_version`].
    pub fn create_graph_version(
        &self,
        graph_id: ItemId,
        input: RichVersionInput,
        edge_version_ids: Vec<VersionId>,
        parent_ids: &[VersionId],
    ) -> Result<GraphVersion> {
        self.items.by_id(ItemKind::Graph, graph_id)?;
        let version = GraphVersion {
            rich: input.into_rich(self.ids.next_id()),
            graph_id,
            edge_version_ids,
        };
        self.attach_version(graph_id, &VersionRecord::Graph(version.clone()), parent_ids)?;
        Ok(version)
    }

    /// Create a new version of a structure: a schema of required tag keys
    /// and types for conforming rich versions.
    ///
    /// # Errors
    /// `ItemNotFound` if the structure does not exist, `InvalidParent` if a
    /// declared parent is not in its DAG.
    pub fn create_structure_version(
        &self,
        structure_id: ItemId,
        attributes: BTreeMap<String, ValueType>,
        parent_ids: &[VersionId],
    ) -> Result<StructureVersion> {
        self.items.by_id(ItemKind::Structure, structure_id)?;
        let version = StructureVersion {
            id: self.ids.next_id(),
            structure_id,
            attributes,
        };
        self.attach_version(
            structure_id,
            &VersionRecord::Structure(version.clone()),
            parent_ids,
        )?;
        Ok(version)
    }

    /// Create a new version of a lineage edge linking two rich versions.
    ///
    /// # Errors
    /// As for [`Catalog::create_node_version`]; additionally
    /// `VersionNotFound` if either linked rich version does not exist.
    pub fn create_lineage_edge_version(
        &self,
        lineage_edge_id: ItemId,
        input: RichVersionInput,
        from_rich_version_id: VersionId,
        to_rich_version_id: VersionId,
        parent_ids: &[VersionId],
    ) -> Result<LineageEdgeVersion> {
        self.items.by_id(ItemKind::LineageEdge, lineage_edge_id)?;
        self.versions.retrieve(from_rich_version_id)?;
        self.versions.retrieve(to_rich_version_id)?;
        let version = LineageEdgeVersion {
            rich: input.into_rich(self.ids.next_id()),
            lineage_edge_id,
            from_rich_version_id,
            to_rich_version_id,
        };
        self.attach_version(
            lineage_edge_id,
            &VersionRecord::LineageEdge(version.clone()),
            parent_ids,
        )?;
        Ok(version)
    }

    /// Create a new version of a lineage graph from its member lineage
    /// edge versions.
    ///
    /// # Errors
    /// As for [`Catalog::create_node_version`].
    pub fn create_lineage_graph_version(
        &self,
        lineage_graph_id: ItemId,
        input: RichVersionInput,
        lineage_edge_version_ids: Vec<VersionId>,
        parent_ids: &[VersionId],
    ) -> Result<LineageGraphVersion> {
        self.items.by_id(ItemKind::LineageGraph, lineage_graph_id)?;
        let version = LineageGraphVersion {
            rich: input.into_rich(self.ids.next_id()),
            lineage_graph_id,
            lineage_edge_version_ids,
        };
        self.attach_version(
            lineage_graph_id,
            &VersionRecord::LineageGraph(version.clone()),
            parent_ids,
        )?;
        Ok(version)
    }

    // ====================================================================
    // Version retrieval
    // ====================================================================

    /// Read a version of any kind.
    ///
    /// # Errors
    /// `VersionNotFound` if no row matches.
    pub fn version(&self, id: VersionId) -> Result<VersionRecord> {
        self.versions.retrieve(id)
    }

    /// Read a node version.
    ///
    /// # Errors
    /// `VersionNotFound` or a kind mismatch.
    pub fn node_version(&self, id: VersionId) -> Result<NodeVersion> {
        self.versions.node_version(id)
    }

    /// Read an edge version.
    ///
    /// # Errors
    /// `VersionNotFound` or a kind mismatch.
    pub fn edge_version(&self, id: VersionId) -> Result<EdgeVersion> {
        self.versions.edge_version(id)
    }

    /// Read a graph version.
    ///
    /// # Errors
    /// `VersionNotFound` or a kind mismatch.
    pub fn graph_version(&self, id: VersionId) -> Result<GraphVersion> {
        self.versions.graph_version(id)
    }

    /// Read a structure version.
    ///
    /// # Errors
    /// `VersionNotFound` or a kind mismatch.
    pub fn structure_version(&self, id: VersionId) -> Result<StructureVersion> {
        self.versions.structure_version(id)
    }

    /// Read a lineage edge version.
    ///
    /// # Errors
    /// `VersionNotFound` or a kind mismatch.
    pub fn lineage_edge_version(&self, id: VersionId) -> Result<LineageEdgeVersion> {
        self.versions.lineage_edge_version(id)
    }

    /// Read a lineage graph version.
    ///
    /// # Errors
    /// `VersionNotFound` or a kind mismatch.
    pub fn lineage_graph_version(&self, id: VersionId) -> Result<LineageGraphVersion> {
        self.versions.lineage_graph_version(id)
    }

    // ====================================================================
    // History queries and truncation
    // ====================================================================

    /// The current leaves of an item's version DAG.
    ///
    /// An item with no versions yet has no leaves — that is an empty list,
    /// not an error.
    ///
    /// # Errors
    /// `ItemNotFound` if the source key does not resolve.
    pub fn leaves(&self, kind: ItemKind, source_key: &str) -> Result<Vec<VersionId>> {
        let item = self.items.by_source_key(kind, source_key)?;
        Ok(self.dags.retrieve(item.id())?.leaves())
    }

    /// The full parent → children relation of an item's DAG.
    ///
    /// Empty for an item with no versions.
    ///
    /// # Errors
    /// Fails only if the DAG rows cannot be read.
    pub fn history(&self, item_id: ItemId) -> Result<BTreeMap<VersionId, Vec<VersionId>>> {
        Ok(self.dags.retrieve(item_id)?.parent_child_pairs())
    }

    /// Attach an existing version under the given parents.
    ///
    /// Version creation does this implicitly; this entry point exists for
    /// callers that manage version records themselves.
    ///
    /// # Errors
    /// `InvalidParent` if any declared parent is not in the item's DAG.
    pub fn update(
        &self,
        item_id: ItemId,
        child_id: VersionId,
        parent_ids: &[VersionId],
    ) -> Result<()> {
        let lock = self.item_lock(item_id);
        let _guard = lock.lock();
        let mut dag = self.dags.retrieve(item_id)?;
        let batch = self.dags.update(&mut dag, child_id, parent_ids)?;
        self.store.apply(batch)
    }

    /// Prune an item's DAG to its `num_levels` most recent generations.
    ///
    /// # Errors
    /// `InvalidOperation` if `num_levels` is zero or the prune would
    /// violate the kept/discarded disjointness invariant.
    pub fn truncate(&self, kind: ItemKind, item_id: ItemId, num_levels: usize) -> Result<()> {
        let lock = self.item_lock(item_id);
        let _guard = lock.lock();
        self.dags.truncate(kind, item_id, num_levels)
    }

    // ====================================================================
    // Search
    // ====================================================================

    /// Ids of every item carrying a tag with this key.
    ///
    /// # Errors
    /// Fails only if the index rows cannot be read.
    pub fn item_ids_by_tag_key(&self, key: &str) -> Result<Vec<ItemId>> {
        self.tags.owners_by_key(TagDomain::Item, key)
    }

    /// Ids of every rich version carrying a tag with this key.
    ///
    /// # Errors
    /// Fails only if the index rows cannot be read.
    pub fn version_ids_by_tag_key(&self, key: &str) -> Result<Vec<VersionId>> {
        self.tags.owners_by_key(TagDomain::Version, key)
    }

    /// Edge versions whose closed endpoint interval ends at this node
    /// version — the adjacency view written by interval maintenance.
    ///
    /// # Errors
    /// Fails only if the adjacency rows cannot be read.
    pub fn edge_versions_adjacent_to(&self, node_version_id: VersionId) -> Result<Vec<VersionId>> {
        let rows = self
            .store
            .scan_prefix(&CatalogKey::adjacency_prefix(node_version_id))?;
        Ok(rows
            .into_iter()
            .filter_map(|(key, _)| key.trailing_id())
            .collect())
    }
}

fn own_tags(owner_id: u64, tags: BTreeMap<String, Tag>) -> BTreeMap<String, Tag> {
    tags.into_iter()
        .map(|(key, tag)| {
            let tag = tag.attach(owner_id, key.clone());
            (key, tag)
        })
        .collect()
}
