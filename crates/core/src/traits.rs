//! Storage abstraction
//!
//! The catalog core never talks to a backend directly: it reads rows
//! through the [`Store`] trait and expresses every mutation as a
//! [`Statement`] collected into a [`Batch`]. The DAG and truncation
//! algorithms build batches backend-agnostically, then commit them in one
//! `apply` call. Adapters for other backends (relational, wide-column,
//! graph) implement this trait and translate statements into their own
//! query text.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync).

use crate::error::{Error, Result};
use crate::item::Item;
use crate::successor::VersionSuccessor;
use crate::tag::Tag;
use crate::types::CatalogKey;
use crate::version::VersionRecord;

/// One stored row.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// An item row
    Item(Item),
    /// A version row
    Version(VersionRecord),
    /// A version-successor row
    Successor(VersionSuccessor),
    /// A tag row
    Tag(Tag),
    /// A bare id payload, used by index rows that point at another row
    Id(u64),
    /// A keys-only row; all information lives in the key
    Unit,
}

impl Record {
    /// Decode as an item row
    pub fn into_item(self) -> Result<Item> {
        match self {
            Record::Item(item) => Ok(item),
            other => Err(decode_mismatch("item", &other)),
        }
    }

    /// Decode as a version row
    pub fn into_version(self) -> Result<VersionRecord> {
        match self {
            Record::Version(version) => Ok(version),
            other => Err(decode_mismatch("version", &other)),
        }
    }

    /// Decode as a successor row
    pub fn into_successor(self) -> Result<VersionSuccessor> {
        match self {
            Record::Successor(successor) => Ok(successor),
            other => Err(decode_mismatch("successor", &other)),
        }
    }

    /// Decode as a tag row
    pub fn into_tag(self) -> Result<Tag> {
        match self {
            Record::Tag(tag) => Ok(tag),
            other => Err(decode_mismatch("tag", &other)),
        }
    }

    /// Decode as an id payload
    pub fn into_id(self) -> Result<u64> {
        match self {
            Record::Id(id) => Ok(id),
            other => Err(decode_mismatch("id", &other)),
        }
    }
}

fn decode_mismatch(expected: &str, found: &Record) -> Error {
    Error::Storage(format!("expected {expected} row, found {found:?}"))
}

/// One storage mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Insert or replace a row
    Put {
        /// Row key
        key: CatalogKey,
        /// Row payload
        record: Record,
    },
    /// Delete a row if present
    Delete {
        /// Row key
        key: CatalogKey,
    },
}

/// An ordered collection of statements committed as one unit.
///
/// Mirrors the statement-batching interface the catalog's algorithms are
/// written against: `append` one statement, `merge` another batch, execute
/// everything through [`Store::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    statements: Vec<Statement>,
}

impl Batch {
    /// An empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement
    pub fn append(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Append a put statement
    pub fn put(&mut self, key: CatalogKey, record: Record) {
        self.append(Statement::Put { key, record });
    }

    /// Append a delete statement
    pub fn delete(&mut self, key: CatalogKey) {
        self.append(Statement::Delete { key });
    }

    /// Append all statements of another batch, preserving order
    pub fn merge(&mut self, other: Batch) {
        self.statements.extend(other.statements);
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// True if the batch holds no statements
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// The collected statements, in append order
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Consume the batch, yielding its statements
    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

/// Capability interface every storage adapter provides.
pub trait Store: Send + Sync {
    /// Read one row
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &CatalogKey) -> Result<Option<Record>>;

    /// Insert or replace one row
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn put(&self, key: CatalogKey, record: Record) -> Result<()>;

    /// Delete one row, reporting whether it existed
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn delete(&self, key: &CatalogKey) -> Result<bool>;

    /// All rows whose key starts with `prefix`, in key order
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn scan_prefix(&self, prefix: &CatalogKey) -> Result<Vec<(CatalogKey, Record)>>;

    /// Execute a batch as one all-or-nothing unit
    ///
    /// # Errors
    /// Returns an error if the storage operation fails; callers must treat
    /// a failed batch as aborted in full.
    fn apply(&self, batch: Batch) -> Result<()>;

    /// Row-existence check
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn contains(&self, key: &CatalogKey) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
