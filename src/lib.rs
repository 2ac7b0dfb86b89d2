//! Loam — embedded versioned-metadata catalog
//!
//! Loam tracks the version history of first-class catalog entities (nodes,
//! edges, graphs, schemas, lineage relations) as an append-mostly DAG,
//! decoupled from the physical store that persists it.
//!
//! # Quick start
//!
//! ```
//! use loam::{Catalog, MemoryStore, RichVersionInput};
//! use std::sync::Arc;
//!
//! let catalog = Catalog::new(Arc::new(MemoryStore::new()));
//!
//! // Create an item, then grow its version history
//! let node = catalog.create_node("Users", "users", Default::default()).unwrap();
//! let v1 = catalog
//!     .create_node_version(node.id(), RichVersionInput::new(), &[])
//!     .unwrap();
//! let v2 = catalog
//!     .create_node_version(node.id(), RichVersionInput::new(), &[v1.rich.id])
//!     .unwrap();
//!
//! assert_eq!(
//!     catalog.leaves(loam::ItemKind::Node, "users").unwrap(),
//!     vec![v2.rich.id]
//! );
//! ```
//!
//! # Architecture
//!
//! The workspace layers leaves-first: `loam-core` holds the model types and
//! the `Store` capability trait, `loam-storage` ships the reference
//! in-memory adapter, and `loam-catalog` implements the catalog engine.
//! This crate re-exports the public API.

pub use loam_catalog::{Catalog, CatalogConfig, IdGenerator, RichVersionInput};
pub use loam_core::{
    Batch, CatalogKey, EdgeItem, EdgeVersion, Error, GraphVersion, Item, ItemCore, ItemId,
    ItemKind, LineageEdgeVersion, LineageGraphVersion, NodeVersion, Record, Result, RichVersion,
    Statement, Store, StructureVersion, SuccessorId, Tag, TagDomain, TagValue, ValueType,
    VersionHistoryDag, VersionId, VersionRecord, VersionSuccessor, Violation, ROOT_VERSION,
};
pub use loam_storage::MemoryStore;
