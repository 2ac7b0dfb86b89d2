//! Core types and traits for the loam catalog
//!
//! This crate defines the foundational, I/O-free pieces of the system:
//! - Id aliases and the root sentinel
//! - `ItemKind` / `RecordKind` / `CatalogKey`: typed keys for unified storage
//! - `Tag`, `TagValue`, `ValueType`: typed key/value attributes
//! - `Item` and its kind-specific variants
//! - `RichVersion` and the version-kind records, with structure conformance
//! - `VersionSuccessor` and the per-item `VersionHistoryDag`
//! - `Store` / `Statement` / `Batch`: the storage capability interface
//! - `Error`: the error hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dag;
pub mod error;
pub mod item;
pub mod successor;
pub mod tag;
pub mod traits;
pub mod types;
pub mod version;

// Re-export commonly used types at the crate root
pub use dag::VersionHistoryDag;
pub use error::{Error, Result, Violation};
pub use item::{EdgeItem, Item, ItemCore};
pub use successor::VersionSuccessor;
pub use tag::{Tag, TagValue, ValueType};
pub use traits::{Batch, Record, Statement, Store};
pub use types::{
    CatalogKey, ItemId, ItemKind, RecordKind, SuccessorId, TagDomain, VersionId, ROOT_VERSION,
};
pub use version::{
    EdgeVersion, GraphVersion, LineageEdgeVersion, LineageGraphVersion, NodeVersion, RichVersion,
    StructureVersion, VersionRecord,
};
