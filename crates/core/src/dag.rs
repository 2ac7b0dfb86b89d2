//! Per-item version-history DAGs
//!
//! `VersionHistoryDag` is the in-memory view of all successor edges
//! belonging to one item. It is a plain value type: persistence lives in
//! the catalog layer, which loads a DAG, validates and applies mutations
//! against it, and writes the resulting statements back through a store.
//!
//! Invariant: the DAG is acyclic and weakly connected to the root sentinel
//! `0` — every version reachable in the DAG has a path of parent edges back
//! to the root. This holds because an edge is only ever inserted with a
//! parent that is already in the DAG (or the sentinel), and versions are
//! never re-parented.

use crate::successor::VersionSuccessor;
use crate::types::{ItemId, SuccessorId, VersionId, ROOT_VERSION};
use std::collections::{BTreeMap, BTreeSet};

/// The set of successor edges belonging to one item.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionHistoryDag {
    item_id: ItemId,
    edges: Vec<VersionSuccessor>,
    // parent → children and child → parents adjacency, kept in sync with `edges`
    children: BTreeMap<VersionId, Vec<VersionId>>,
    parents: BTreeMap<VersionId, Vec<VersionId>>,
}

impl VersionHistoryDag {
    /// Build a DAG from the successor edges loaded for an item.
    pub fn new(item_id: ItemId, edges: Vec<VersionSuccessor>) -> Self {
        let mut dag = Self::empty(item_id);
        for edge in edges {
            dag.add_edge(edge);
        }
        dag
    }

    /// An empty DAG for a brand-new (or versionless) item.
    pub fn empty(item_id: ItemId) -> Self {
        Self {
            item_id,
            edges: Vec::new(),
            children: BTreeMap::new(),
            parents: BTreeMap::new(),
        }
    }

    /// The owning item's id
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// All successor edges, in insertion order
    pub fn edges(&self) -> &[VersionSuccessor] {
        &self.edges
    }

    /// Ids of all successor edges
    pub fn edge_ids(&self) -> Vec<SuccessorId> {
        self.edges.iter().map(|e| e.id).collect()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True if the item has no versions yet
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Record an edge in the in-memory view.
    ///
    /// Parent-existence validation is the caller's job; this only maintains
    /// the adjacency indexes.
    pub fn add_edge(&mut self, edge: VersionSuccessor) {
        self.children.entry(edge.from_id).or_default().push(edge.to_id);
        self.parents.entry(edge.to_id).or_default().push(edge.from_id);
        self.edges.push(edge);
    }

    /// Check whether a version id appears anywhere in the DAG.
    pub fn contains_version(&self, id: VersionId) -> bool {
        self.parents.contains_key(&id)
            || (id != ROOT_VERSION && self.children.contains_key(&id))
    }

    /// Versions with no outgoing successor edge — the newest generation.
    ///
    /// A leaf is a `to_id` of some edge that is never a `from_id` of any
    /// edge in this DAG. Returned sorted and deduplicated.
    pub fn leaves(&self) -> Vec<VersionId> {
        self.parents
            .keys()
            .filter(|id| !self.children.contains_key(id))
            .copied()
            .collect()
    }

    /// Direct parents of a version: all `from_id`s of edges pointing at it.
    ///
    /// Empty for versions not in the DAG (and for the root sentinel).
    pub fn parents_of(&self, id: VersionId) -> Vec<VersionId> {
        self.parents.get(&id).cloned().unwrap_or_default()
    }

    /// Successor edges whose `to_id` is the given version.
    pub fn edges_into(&self, id: VersionId) -> Vec<VersionSuccessor> {
        self.edges.iter().filter(|e| e.to_id == id).copied().collect()
    }

    /// The full parent → children relation, including root edges.
    ///
    /// A multimap: after a branch, one parent maps to several children.
    pub fn parent_child_pairs(&self) -> BTreeMap<VersionId, Vec<VersionId>> {
        self.children.clone()
    }

    /// Every version id reachable from `id` by repeatedly following parents,
    /// excluding `id` itself and the root sentinel.
    pub fn ancestors_of(&self, id: VersionId) -> BTreeSet<VersionId> {
        let mut seen = BTreeSet::new();
        let mut queue: Vec<VersionId> = self.parents_of(id);
        while let Some(current) = queue.pop() {
            if current == ROOT_VERSION || !seen.insert(current) {
                continue;
            }
            queue.extend(self.parents_of(current));
        }
        seen
    }
}
