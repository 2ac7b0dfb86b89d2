//! Version persistence and structure conformance
//!
//! Versions are written once and never updated, with one exception: edge
//! endpoint-interval closure (see `edges`). A rich version that declares a
//! structure is validated against it before any statement is produced, so
//! a violation can never leave a partial write behind.

use crate::tags::TagStore;
use loam_core::{
    Batch, CatalogKey, EdgeVersion, Error, GraphVersion, LineageEdgeVersion, LineageGraphVersion,
    NodeVersion, Record, Result, RichVersion, Store, StructureVersion, Tag, TagDomain, VersionId,
    VersionRecord,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Input for creating any rich version: everything but the generated id and
/// the kind-specific payload.
#[derive(Debug, Clone, Default)]
pub struct RichVersionInput {
    /// Version-level tags, keyed by tag key
    pub tags: BTreeMap<String, Tag>,
    /// Structure version to validate the tags against, if any
    pub structure_version_id: Option<VersionId>,
    /// External reference (a URI), if any
    pub reference: Option<String>,
    /// Access parameters for `reference`
    pub parameters: BTreeMap<String, String>,
}

impl RichVersionInput {
    /// An empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one tag (owner is fixed up at creation time)
    pub fn tag(mut self, key: &str, value: Option<loam_core::TagValue>) -> Self {
        self.tags.insert(key.to_string(), Tag::new(0, key, value));
        self
    }

    /// Declare conformance to a structure version
    pub fn structure(mut self, structure_version_id: VersionId) -> Self {
        self.structure_version_id = Some(structure_version_id);
        self
    }

    /// Set the external reference and its access parameters
    pub fn reference(mut self, uri: &str, parameters: BTreeMap<String, String>) -> Self {
        self.reference = Some(uri.to_string());
        self.parameters = parameters;
        self
    }

    /// Materialize the rich base record under its generated id.
    pub(crate) fn into_rich(self, id: VersionId) -> RichVersion {
        let tags = self
            .tags
            .into_iter()
            .map(|(key, tag)| {
                let tag = tag.attach(id, key.clone());
                (key, tag)
            })
            .collect();
        RichVersion::new(
            id,
            tags,
            self.structure_version_id,
            self.reference,
            self.parameters,
        )
    }
}

/// Persists versions through a store.
#[derive(Clone)]
pub struct VersionStore {
    store: Arc<dyn Store>,
    tags: TagStore,
}

impl VersionStore {
    /// Create a version store over a storage adapter
    pub fn new(store: Arc<dyn Store>) -> Self {
        let tags = TagStore::new(store.clone());
        Self { store, tags }
    }

    /// Read a version of any kind.
    ///
    /// # Errors
    /// `VersionNotFound` if no row matches.
    pub fn retrieve(&self, id: VersionId) -> Result<VersionRecord> {
        self.store
            .get(&CatalogKey::version(id))?
            .ok_or(Error::VersionNotFound(id))?
            .into_version()
    }

    /// Read a node version.
    ///
    /// # Errors
    /// `VersionNotFound` if absent, `InvalidOperation` if the row holds a
    /// version of another kind.
    pub fn node_version(&self, id: VersionId) -> Result<NodeVersion> {
        match self.retrieve(id)? {
            VersionRecord::Node(version) => Ok(version),
            other => Err(wrong_kind(id, "node", &other)),
        }
    }

    /// Read an edge version.
    ///
    /// # Errors
    /// `VersionNotFound` if absent, `InvalidOperation` on a kind mismatch.
    pub fn edge_version(&self, id: VersionId) -> Result<EdgeVersion> {
        match self.retrieve(id)? {
            VersionRecord::Edge(version) => Ok(version),
            other => Err(wrong_kind(id, "edge", &other)),
        }
    }

    /// Read a structure version.
    ///
    /// # Errors
    /// `VersionNotFound` if absent, `InvalidOperation` on a kind mismatch.
    pub fn structure_version(&self, id: VersionId) -> Result<StructureVersion> {
        match self.retrieve(id)? {
            VersionRecord::Structure(version) => Ok(version),
            other => Err(wrong_kind(id, "structure", &other)),
        }
    }

    /// Read a graph version.
    ///
    /// # Errors
    /// `VersionNotFound` if absent, `InvalidOperation` on a kind mismatch.
    pub fn graph_version(&self, id: VersionId) -> Result<GraphVersion> {
        match self.retrieve(id)? {
            VersionRecord::Graph(version) => Ok(version),
            other => Err(wrong_kind(id, "graph", &other)),
        }
    }

    /// Read a lineage edge version.
    ///
    /// # Errors
    /// `VersionNotFound` if absent, `InvalidOperation` on a kind mismatch.
    pub fn lineage_edge_version(&self, id: VersionId) -> Result<LineageEdgeVersion> {
        match self.retrieve(id)? {
            VersionRecord::LineageEdge(version) => Ok(version),
            other => Err(wrong_kind(id, "lineage edge", &other)),
        }
    }

    /// Read a lineage graph version.
    ///
    /// # Errors
    /// `VersionNotFound` if absent, `InvalidOperation` on a kind mismatch.
    pub fn lineage_graph_version(&self, id: VersionId) -> Result<LineageGraphVersion> {
        match self.retrieve(id)? {
            VersionRecord::LineageGraph(version) => Ok(version),
            other => Err(wrong_kind(id, "lineage graph", &other)),
        }
    }

    /// Statements persisting a version and its tags.
    ///
    /// If the version declares a structure, its tags are checked for
    /// conformance first; a violation produces no statements at all.
    ///
    /// # Errors
    /// `VersionNotFound` if the declared structure version does not exist,
    /// `StructureViolation` if the tags fail conformance.
    pub fn insert_statements(&self, record: &VersionRecord) -> Result<Batch> {
        if let Some(rich) = record.rich() {
            if let Some(structure_version_id) = rich.structure_version_id {
                let structure_version = self.structure_version(structure_version_id)?;
                structure_version.check_conformance(&rich.tags)?;
            }
        }
        let mut batch = Batch::new();
        batch.put(
            CatalogKey::version(record.id()),
            Record::Version(record.clone()),
        );
        if let Some(rich) = record.rich() {
            for tag in rich.tags.values() {
                batch.merge(self.tags.insert_statements(TagDomain::Version, tag));
            }
        }
        Ok(batch)
    }

}

fn wrong_kind(id: VersionId, expected: &str, found: &VersionRecord) -> Error {
    Error::InvalidOperation(format!(
        "version {} is a {} version, not a {} version",
        id,
        found.kind(),
        expected
    ))
}
