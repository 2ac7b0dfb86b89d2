//! Tag persistence
//!
//! Tags are purely additive: rows are written alongside their owner and
//! never updated or deleted individually (truncation drops a deleted
//! version's tags wholesale). Each tag write also maintains a reverse-index
//! row so the catalog can be searched by tag key across all owners of a
//! domain. Item-level and version-level tags live in separate tables.

use loam_core::{Batch, CatalogKey, Record, Result, Store, Tag, TagDomain};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Persists tags through a store.
#[derive(Clone)]
pub struct TagStore {
    store: Arc<dyn Store>,
}

impl TagStore {
    /// Create a tag store over a storage adapter
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Statements inserting one tag and its reverse-index row
    pub fn insert_statements(&self, domain: TagDomain, tag: &Tag) -> Batch {
        let mut batch = Batch::new();
        batch.put(
            CatalogKey::tag(domain, tag.owner_id, &tag.key),
            Record::Tag(tag.clone()),
        );
        batch.put(
            CatalogKey::tag_index(domain, &tag.key, tag.owner_id),
            Record::Unit,
        );
        batch
    }

    /// All tags of one owner, keyed by tag key.
    ///
    /// A tag row without a value decodes to a bare tag, never an error.
    ///
    /// # Errors
    /// Fails only if the underlying rows cannot be read.
    pub fn tags_for_owner(&self, domain: TagDomain, owner_id: u64) -> Result<BTreeMap<String, Tag>> {
        let rows = self
            .store
            .scan_prefix(&CatalogKey::tag_prefix(domain, owner_id))?;
        let mut tags = BTreeMap::new();
        for (_, record) in rows {
            let tag = record.into_tag()?;
            tags.insert(tag.key.clone(), tag);
        }
        Ok(tags)
    }

    /// Reverse lookup: ids of every owner carrying a tag with this key.
    ///
    /// # Errors
    /// Fails only if the underlying rows cannot be read.
    pub fn owners_by_key(&self, domain: TagDomain, key: &str) -> Result<Vec<u64>> {
        let rows = self
            .store
            .scan_prefix(&CatalogKey::tag_index_prefix(domain, key))?;
        let mut owners = Vec::with_capacity(rows.len());
        for (row_key, _) in rows {
            if let Some(owner) = row_key.trailing_id() {
                owners.push(owner);
            }
        }
        Ok(owners)
    }

    /// Statements deleting every tag of one owner, index rows included.
    ///
    /// Used by truncation when a version is discarded.
    ///
    /// # Errors
    /// Fails only if the owner's tag rows cannot be read.
    pub fn delete_statements_for_owner(
        &self,
        domain: TagDomain,
        owner_id: u64,
    ) -> Result<Batch> {
        let mut batch = Batch::new();
        for (key, record) in self
            .store
            .scan_prefix(&CatalogKey::tag_prefix(domain, owner_id))?
        {
            let tag = record.into_tag()?;
            batch.delete(key);
            batch.delete(CatalogKey::tag_index(domain, &tag.key, owner_id));
        }
        Ok(batch)
    }
}
