//! Version-history DAG persistence
//!
//! A DAG is stored as successor rows (one per edge) plus membership rows
//! linking each successor to its owning item. Mutations are expressed as
//! statements so a multi-edge update commits as one batch.

use crate::ids::IdGenerator;
use crate::tags::TagStore;
use loam_core::{
    Batch, CatalogKey, Error, ItemId, ItemKind, Record, Result, Store, TagDomain,
    VersionHistoryDag, VersionId, VersionSuccessor, ROOT_VERSION,
};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// Persists per-item version-history DAGs through a store.
#[derive(Clone)]
pub struct DagStore {
    store: Arc<dyn Store>,
    ids: Arc<IdGenerator>,
    tags: TagStore,
}

impl DagStore {
    /// Create a DAG store over a storage adapter
    pub fn new(store: Arc<dyn Store>, ids: Arc<IdGenerator>) -> Self {
        let tags = TagStore::new(store.clone());
        Self { store, ids, tags }
    }

    /// An empty DAG for a brand-new item
    pub fn create(&self, item_id: ItemId) -> VersionHistoryDag {
        VersionHistoryDag::empty(item_id)
    }

    /// Load the DAG of an item.
    ///
    /// An item with zero versions yields an empty DAG — callers treat that
    /// as "no leaves, no history", not as an error.
    ///
    /// # Errors
    /// Fails only if successor rows cannot be read or are dangling.
    pub fn retrieve(&self, item_id: ItemId) -> Result<VersionHistoryDag> {
        let rows = self.store.scan_prefix(&CatalogKey::dag_prefix(item_id))?;
        let mut edges = Vec::with_capacity(rows.len());
        for (_, record) in rows {
            let successor_id = record.into_id()?;
            let successor = self
                .store
                .get(&CatalogKey::successor(successor_id))?
                .ok_or_else(|| {
                    Error::Storage(format!(
                        "dangling successor {} in item {}",
                        successor_id, item_id
                    ))
                })?
                .into_successor()?;
            edges.push(successor);
        }
        Ok(VersionHistoryDag::new(item_id, edges))
    }

    /// Record one parent→child edge.
    ///
    /// The parent must be the root sentinel or already present in the DAG.
    /// Returns the statements persisting the successor row and its
    /// membership row; no I/O happens here, so several edges can commit as
    /// one batch.
    ///
    /// # Errors
    /// `InvalidParent` if the parent is neither the sentinel nor a member.
    pub fn add_edge(
        &self,
        dag: &mut VersionHistoryDag,
        parent_id: VersionId,
        child_id: VersionId,
    ) -> Result<Batch> {
        if parent_id != ROOT_VERSION && !dag.contains_version(parent_id) {
            return Err(Error::InvalidParent {
                parent: parent_id,
                item: dag.item_id(),
            });
        }
        let successor = VersionSuccessor::new(self.ids.next_id(), parent_id, child_id);
        let mut batch = Batch::new();
        batch.put(
            CatalogKey::successor(successor.id),
            Record::Successor(successor),
        );
        batch.put(
            CatalogKey::dag_edge(dag.item_id(), successor.id),
            Record::Id(successor.id),
        );
        dag.add_edge(successor);
        Ok(batch)
    }

    /// Attach a child version under its declared parents.
    ///
    /// An empty parent list means `[0]`: the version hangs directly off the
    /// root. All parents are validated before any edge is recorded, so an
    /// invalid parent fails the whole update with no partial edge set.
    ///
    /// # Errors
    /// `InvalidParent` if any declared parent is not in the DAG.
    pub fn update(
        &self,
        dag: &mut VersionHistoryDag,
        child_id: VersionId,
        parent_ids: &[VersionId],
    ) -> Result<Batch> {
        let parents: Vec<VersionId> = if parent_ids.is_empty() {
            vec![ROOT_VERSION]
        } else {
            parent_ids.to_vec()
        };
        for &parent in &parents {
            if parent != ROOT_VERSION && !dag.contains_version(parent) {
                return Err(Error::InvalidParent {
                    parent,
                    item: dag.item_id(),
                });
            }
        }
        let mut batch = Batch::new();
        for parent in parents {
            batch.merge(self.add_edge(dag, parent, child_id)?);
        }
        debug!(item = dag.item_id(), child = child_id, edges = batch.len() / 2, "attached version");
        Ok(batch)
    }

    /// Prune the DAG to its `num_levels` most recent generations.
    ///
    /// Everything older is discarded permanently: successor rows, version
    /// rows, and version tags. The oldest kept generation is re-rooted
    /// directly under the sentinel so every survivor stays reachable. The
    /// whole mutation commits as one batch.
    ///
    /// # Errors
    /// `InvalidOperation` if `num_levels` is zero, or if the ancestor walk
    /// would delete a version that is simultaneously being re-rooted (the
    /// kept and discarded sets must never overlap).
    pub fn truncate(&self, kind: ItemKind, item_id: ItemId, num_levels: usize) -> Result<()> {
        if num_levels == 0 {
            return Err(Error::InvalidOperation(
                "truncation must keep at least one level".into(),
            ));
        }
        let mut dag = self.retrieve(item_id)?;
        if dag.is_empty() {
            return Ok(());
        }

        // Walk `num_levels` generations up from the leaves. After the loop,
        // `last_level` is the oldest generation being kept and `frontier`
        // the first generation being discarded.
        let mut frontier: Vec<VersionId> = dag.leaves();
        let mut last_level: Vec<VersionId> = Vec::new();
        for _ in 0..num_levels {
            last_level = frontier.clone();
            let mut next: BTreeSet<VersionId> = BTreeSet::new();
            for &version in &frontier {
                // the sentinel is not a generation; it never enters a frontier
                next.extend(
                    dag.parents_of(version)
                        .into_iter()
                        .filter(|&parent| parent != ROOT_VERSION),
                );
            }
            frontier = next.into_iter().collect();
        }

        let rerooted: BTreeSet<VersionId> = last_level.into_iter().collect();
        let mut batch = Batch::new();

        // Re-root the oldest kept generation: drop its old incoming edges
        // and hang each survivor directly off the sentinel.
        for &version in &rerooted {
            self.delete_edges_into(&mut batch, &dag, version);
            batch.merge(self.add_edge(&mut dag, ROOT_VERSION, version)?);
        }

        // Worklist deletion of the cut generation and all its ancestors.
        let mut deleted: BTreeSet<VersionId> = BTreeSet::new();
        let mut queue: VecDeque<VersionId> = frontier
            .into_iter()
            .filter(|&version| version != ROOT_VERSION)
            .collect();
        while let Some(version) = queue.pop_front() {
            if deleted.contains(&version) {
                continue;
            }
            if rerooted.contains(&version) {
                return Err(Error::InvalidOperation(format!(
                    "truncation of item {} would discard re-rooted version {}",
                    item_id, version
                )));
            }
            self.delete_edges_into(&mut batch, &dag, version);
            batch.delete(CatalogKey::version(version));
            if kind != ItemKind::Structure {
                batch.merge(
                    self.tags
                        .delete_statements_for_owner(TagDomain::Version, version)?,
                );
            }
            deleted.insert(version);
            for parent in dag.parents_of(version) {
                if parent != ROOT_VERSION && !deleted.contains(&parent) {
                    queue.push_back(parent);
                }
            }
        }

        info!(
            item = item_id,
            kept = rerooted.len(),
            discarded = deleted.len(),
            "truncated version history"
        );
        self.store.apply(batch)
    }

    /// Statements deleting every successor edge pointing at a version,
    /// together with the matching membership rows.
    fn delete_edges_into(&self, batch: &mut Batch, dag: &VersionHistoryDag, version: VersionId) {
        for successor in dag.edges_into(version) {
            batch.delete(CatalogKey::successor(successor.id));
            batch.delete(CatalogKey::dag_edge(dag.item_id(), successor.id));
        }
    }
}
