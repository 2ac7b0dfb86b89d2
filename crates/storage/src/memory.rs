//! MemoryStore: reference storage adapter
//!
//! Implements the `Store` trait with:
//! - `BTreeMap<CatalogKey, Record>` for ordered row storage
//! - `parking_lot::RwLock` for thread-safe access
//!
//! # Design Notes
//!
//! - **Prefix scans ride the key order**: keys sort by record kind then
//!   user key, so a scan starts at the prefix and stops at the first
//!   non-matching key.
//! - **Batches hold the write lock once**: `apply` acquires the write lock
//!   for the whole statement list, so readers never observe a partial
//!   batch. Backends without multi-statement transactions cannot give this
//!   guarantee; callers treat their failures per the catalog's unit-of-work
//!   rules.

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;
use tracing::trace;

use loam_core::{Batch, CatalogKey, Record, Result, Statement, Store};

/// Ordered in-memory storage adapter.
///
/// # Example
///
/// ```
/// use loam_core::{CatalogKey, Record, RecordKind, Store};
/// use loam_storage::MemoryStore;
///
/// let store = MemoryStore::new();
/// let key = CatalogKey::new(RecordKind::Item, vec![1]);
/// store.put(key.clone(), Record::Id(42)).unwrap();
/// assert!(store.contains(&key).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<CatalogKey, Record>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if no rows are stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &CatalogKey) -> Result<Option<Record>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: CatalogKey, record: Record) -> Result<()> {
        self.data.write().insert(key, record);
        Ok(())
    }

    fn delete(&self, key: &CatalogKey) -> Result<bool> {
        Ok(self.data.write().remove(key).is_some())
    }

    fn scan_prefix(&self, prefix: &CatalogKey) -> Result<Vec<(CatalogKey, Record)>> {
        let data = self.data.read();
        let rows = data
            .range((Bound::Included(prefix.clone()), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        Ok(rows)
    }

    fn apply(&self, batch: Batch) -> Result<()> {
        // One write-lock acquisition for the entire batch: readers see
        // either none or all of it.
        let mut data = self.data.write();
        trace!(statements = batch.len(), "applying batch");
        for statement in batch.into_statements() {
            match statement {
                Statement::Put { key, record } => {
                    data.insert(key, record);
                }
                Statement::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_core::{ItemKind, RecordKind, TagDomain, VersionSuccessor};

    fn key(kind: RecordKind, bytes: &[u8]) -> CatalogKey {
        CatalogKey::new(kind, bytes.to_vec())
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get(&key(RecordKind::Item, b"missing")).unwrap().is_none());
    }

    #[test]
    fn put_then_get_returns_record() {
        let store = MemoryStore::new();
        let k = key(RecordKind::Item, b"k");
        store.put(k.clone(), Record::Id(9)).unwrap();
        assert_eq!(store.get(&k).unwrap(), Some(Record::Id(9)));
    }

    #[test]
    fn put_overwrites_existing_row() {
        let store = MemoryStore::new();
        let k = key(RecordKind::Item, b"k");
        store.put(k.clone(), Record::Id(1)).unwrap();
        store.put(k.clone(), Record::Id(2)).unwrap();
        assert_eq!(store.get(&k).unwrap(), Some(Record::Id(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_reports_prior_existence() {
        let store = MemoryStore::new();
        let k = key(RecordKind::Item, b"k");
        store.put(k.clone(), Record::Unit).unwrap();
        assert!(store.delete(&k).unwrap());
        assert!(!store.delete(&k).unwrap());
        assert!(store.get(&k).unwrap().is_none());
    }

    #[test]
    fn scan_prefix_returns_matching_rows_in_key_order() {
        let store = MemoryStore::new();
        store
            .put(CatalogKey::dag_edge(1, 20), Record::Id(20))
            .unwrap();
        store
            .put(CatalogKey::dag_edge(1, 10), Record::Id(10))
            .unwrap();
        store
            .put(CatalogKey::dag_edge(2, 5), Record::Id(5))
            .unwrap();

        let rows = store.scan_prefix(&CatalogKey::dag_prefix(1)).unwrap();
        let ids: Vec<u64> = rows
            .into_iter()
            .map(|(_, r)| r.into_id().unwrap())
            .collect();
        assert_eq!(ids, vec![10, 20], "only item 1's rows, successor order");
    }

    #[test]
    fn scan_prefix_does_not_cross_record_kinds() {
        let store = MemoryStore::new();
        store.put(CatalogKey::version(1), Record::Unit).unwrap();
        store
            .put(CatalogKey::successor(1), Record::Successor(VersionSuccessor::new(1, 0, 2)))
            .unwrap();

        let rows = store
            .scan_prefix(&key(RecordKind::Version, b""))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.kind, RecordKind::Version);
    }

    #[test]
    fn scan_prefix_respects_null_separator() {
        let store = MemoryStore::new();
        store
            .put(CatalogKey::tag_index(TagDomain::Item, "x", 1), Record::Unit)
            .unwrap();
        store
            .put(CatalogKey::tag_index(TagDomain::Item, "xy", 2), Record::Unit)
            .unwrap();

        let rows = store
            .scan_prefix(&CatalogKey::tag_index_prefix(TagDomain::Item, "x"))
            .unwrap();
        assert_eq!(rows.len(), 1, "key 'xy' must not match prefix 'x'");
        assert_eq!(rows[0].0.trailing_id(), Some(1));
    }

    #[test]
    fn apply_executes_puts_and_deletes_in_order() {
        let store = MemoryStore::new();
        let kept = CatalogKey::item(ItemKind::Node, 1);
        let dropped = CatalogKey::item(ItemKind::Node, 2);
        store.put(dropped.clone(), Record::Id(2)).unwrap();

        let mut batch = Batch::new();
        batch.put(kept.clone(), Record::Id(1));
        batch.delete(dropped.clone());
        store.apply(batch).unwrap();

        assert!(store.contains(&kept).unwrap());
        assert!(!store.contains(&dropped).unwrap());
    }

    #[test]
    fn apply_later_statement_wins_on_same_key() {
        let store = MemoryStore::new();
        let k = key(RecordKind::Item, b"k");

        let mut batch = Batch::new();
        batch.put(k.clone(), Record::Id(1));
        batch.delete(k.clone());
        store.apply(batch).unwrap();
        assert!(!store.contains(&k).unwrap());

        let mut batch = Batch::new();
        batch.delete(k.clone());
        batch.put(k.clone(), Record::Id(2));
        store.apply(batch).unwrap();
        assert_eq!(store.get(&k).unwrap(), Some(Record::Id(2)));
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let store = MemoryStore::new();
        store.apply(Batch::new()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_writers_do_not_lose_rows() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for t in 0u64..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0u64..100 {
                    let id = t * 1000 + i;
                    store
                        .put(CatalogKey::version(id), Record::Id(id))
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }
}
