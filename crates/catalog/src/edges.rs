//! Edge endpoint-interval maintenance
//!
//! An edge version records, for each endpoint node, the interval of node
//! versions it is valid for. When a child edge version supersedes a parent
//! whose interval is still open, the parent's interval is closed exactly
//! where the node advanced: at the node DAG's direct parent of the child's
//! start id. The closed end also gains an adjacency row so point-in-time
//! queries can find which edge version applied at that node version.
//!
//! Closing an interval requires the child's start id to have exactly one
//! real predecessor in the node's DAG. That relationship is a caller
//! obligation when choosing parents for the new edge version; it is checked
//! here explicitly rather than trusted.

use crate::dag::DagStore;
use crate::versions::VersionStore;
use loam_core::{
    Batch, CatalogKey, EdgeItem, EdgeVersion, Error, Record, Result, VersionHistoryDag, VersionId,
    VersionRecord, ROOT_VERSION,
};
use tracing::debug;

/// Statements closing the open endpoint intervals of a child's parents.
///
/// For each non-root parent edge version:
/// - an open "from" interval is closed at the from-node DAG's direct
///   predecessor of the child's from-start id, and symmetrically for "to";
/// - each computed end id is persisted onto the parent version and recorded
///   as an adjacency row `(end id → parent edge version)`.
///
/// # Errors
/// `VersionNotFound` if a parent row is missing, `InvalidOperation` if a
/// start id does not have exactly one real predecessor in its node's DAG.
pub(crate) fn close_parent_intervals(
    versions: &VersionStore,
    dags: &DagStore,
    edge: &EdgeItem,
    child: &EdgeVersion,
    parent_ids: &[VersionId],
) -> Result<Batch> {
    let mut batch = Batch::new();
    for &parent_id in parent_ids.iter().filter(|&&id| id != ROOT_VERSION) {
        let parent = versions.edge_version(parent_id)?;

        // An interval closes only where its node actually advanced: a child
        // starting at the same node version leaves the parent's interval
        // open there.
        let mut from_end = None;
        if parent.from_node_version_end_id.is_none()
            && child.from_node_version_start_id != parent.from_node_version_start_id
        {
            let node_dag = dags.retrieve(edge.from_node_id)?;
            from_end = Some(direct_predecessor(
                &node_dag,
                child.from_node_version_start_id,
            )?);
        }

        let mut to_end = None;
        if parent.to_node_version_end_id.is_none()
            && child.to_node_version_start_id != parent.to_node_version_start_id
        {
            let node_dag = dags.retrieve(edge.to_node_id)?;
            to_end = Some(direct_predecessor(&node_dag, child.to_node_version_start_id)?);
        }

        if from_end.is_none() && to_end.is_none() {
            continue;
        }

        let mut updated = parent;
        if let Some(end) = from_end {
            updated.from_node_version_end_id = Some(end);
            batch.put(CatalogKey::adjacency(end, parent_id), Record::Unit);
        }
        if let Some(end) = to_end {
            updated.to_node_version_end_id = Some(end);
            batch.put(CatalogKey::adjacency(end, parent_id), Record::Unit);
        }
        batch.put(
            CatalogKey::version(parent_id),
            Record::Version(VersionRecord::Edge(updated)),
        );
        debug!(
            parent = parent_id,
            from_end = ?from_end,
            to_end = ?to_end,
            "closed endpoint interval"
        );
    }
    Ok(batch)
}

/// The single real predecessor of a version in a node's DAG.
fn direct_predecessor(node_dag: &VersionHistoryDag, version: VersionId) -> Result<VersionId> {
    let parents: Vec<VersionId> = node_dag
        .parents_of(version)
        .into_iter()
        .filter(|&parent| parent != ROOT_VERSION)
        .collect();
    match parents.as_slice() {
        [single] => Ok(*single),
        [] => Err(Error::InvalidOperation(format!(
            "version {} has no predecessor in node {}; cannot close an endpoint interval there",
            version,
            node_dag.item_id()
        ))),
        _ => Err(Error::InvalidOperation(format!(
            "version {} has multiple predecessors in node {}; endpoint interval is ambiguous",
            version,
            node_dag.item_id()
        ))),
    }
}
