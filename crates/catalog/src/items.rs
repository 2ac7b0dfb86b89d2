//! Item persistence
//!
//! Items are created once and never mutated: name, source key, endpoints,
//! and item-level tags are all fixed at creation. The source-key index
//! enforces per-kind uniqueness and serves lookups by key.

use crate::tags::TagStore;
use loam_core::{
    Batch, CatalogKey, Error, Item, ItemId, ItemKind, Record, Result, Store, TagDomain,
};
use std::sync::Arc;

/// Persists items through a store.
#[derive(Clone)]
pub struct ItemStore {
    store: Arc<dyn Store>,
    tags: TagStore,
}

impl ItemStore {
    /// Create an item store over a storage adapter
    pub fn new(store: Arc<dyn Store>) -> Self {
        let tags = TagStore::new(store.clone());
        Self { store, tags }
    }

    /// Statements persisting a new item, its source-key index row, and its
    /// item-level tags.
    ///
    /// The duplicate check runs before any statement is produced.
    ///
    /// # Errors
    /// `DuplicateItem` if the source key already resolves to an item of the
    /// same kind.
    pub fn insert_statements(&self, item: &Item) -> Result<Batch> {
        let kind = item.kind();
        let index_key = CatalogKey::source_key(kind, item.source_key());
        if self.store.contains(&index_key)? {
            return Err(Error::DuplicateItem {
                kind,
                source_key: item.source_key().to_string(),
            });
        }
        let mut batch = Batch::new();
        batch.put(CatalogKey::item(kind, item.id()), Record::Item(item.clone()));
        batch.put(index_key, Record::Id(item.id()));
        for tag in item.tags().values() {
            batch.merge(self.tags.insert_statements(TagDomain::Item, tag));
        }
        Ok(batch)
    }

    /// Look an item up by its source key.
    ///
    /// # Errors
    /// `ItemNotFound` if no item of this kind carries the key.
    pub fn by_source_key(&self, kind: ItemKind, source_key: &str) -> Result<Item> {
        let id = self
            .store
            .get(&CatalogKey::source_key(kind, source_key))?
            .ok_or_else(|| Error::ItemNotFound {
                kind,
                key: source_key.to_string(),
            })?
            .into_id()?;
        self.by_id(kind, id)
    }

    /// Look an item up by its generated id.
    ///
    /// # Errors
    /// `ItemNotFound` if no row matches.
    pub fn by_id(&self, kind: ItemKind, id: ItemId) -> Result<Item> {
        self.store
            .get(&CatalogKey::item(kind, id))?
            .ok_or_else(|| Error::ItemNotFound {
                kind,
                key: id.to_string(),
            })?
            .into_item()
    }
}
