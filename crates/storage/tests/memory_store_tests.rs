//! MemoryStore integration tests
//!
//! Exercises the reference adapter under the access patterns the catalog
//! produces: mixed-kind row populations, prefix scans, and batches applied
//! while readers are active.

use loam_core::{Batch, CatalogKey, ItemKind, Record, Store, TagDomain, VersionSuccessor};
use loam_storage::MemoryStore;
use std::sync::Arc;
use std::thread;

#[test]
fn mixed_row_kinds_stay_partitioned() {
    let store = MemoryStore::new();

    store
        .put(CatalogKey::item(ItemKind::Node, 1), Record::Id(1))
        .unwrap();
    store
        .put(CatalogKey::version(1), Record::Id(1))
        .unwrap();
    store
        .put(
            CatalogKey::successor(1),
            Record::Successor(VersionSuccessor::new(1, 0, 10)),
        )
        .unwrap();
    store
        .put(CatalogKey::dag_edge(1, 1), Record::Id(1))
        .unwrap();
    store
        .put(CatalogKey::tag_index(TagDomain::Item, "k", 1), Record::Unit)
        .unwrap();

    // each prefix sees only its own kind, even with equal id bytes
    assert_eq!(store.scan_prefix(&CatalogKey::dag_prefix(1)).unwrap().len(), 1);
    assert_eq!(
        store
            .scan_prefix(&CatalogKey::tag_index_prefix(TagDomain::Item, "k"))
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        store
            .scan_prefix(&CatalogKey::tag_index_prefix(TagDomain::Version, "k"))
            .unwrap()
            .len(),
        0
    );
}

#[test]
fn readers_never_observe_a_partial_batch() {
    let store = Arc::new(MemoryStore::new());
    const ROWS: u64 = 64;

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for round in 0..50u64 {
                let mut batch = Batch::new();
                for i in 0..ROWS {
                    batch.put(CatalogKey::version(i), Record::Id(round));
                }
                store.apply(batch).unwrap();
            }
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..200 {
                let rows = store
                    .scan_prefix(&CatalogKey::new(loam_core::RecordKind::Version, vec![]))
                    .unwrap();
                if rows.is_empty() {
                    continue; // before the first batch
                }
                assert_eq!(rows.len() as u64, ROWS);
                let first = rows[0].1.clone().into_id().unwrap();
                for (_, record) in rows {
                    assert_eq!(
                        record.into_id().unwrap(),
                        first,
                        "a scan must see one batch's rows, never a mix"
                    );
                }
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
}

#[test]
fn deletes_in_a_batch_are_atomic_with_inserts() {
    let store = MemoryStore::new();
    store
        .put(CatalogKey::version(1), Record::Id(1))
        .unwrap();

    // model a truncation: drop the old generation, re-root the new one
    let mut batch = Batch::new();
    batch.delete(CatalogKey::version(1));
    batch.put(
        CatalogKey::successor(9),
        Record::Successor(VersionSuccessor::new(9, 0, 2)),
    );
    store.apply(batch).unwrap();

    assert!(!store.contains(&CatalogKey::version(1)).unwrap());
    assert!(store.contains(&CatalogKey::successor(9)).unwrap());
}
