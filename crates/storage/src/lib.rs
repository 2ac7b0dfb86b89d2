//! Storage adapters for the loam catalog
//!
//! Every adapter implements `loam_core::Store`. This crate ships the
//! reference adapter, an ordered in-memory store. Backends with their own
//! query languages live behind the same trait and are not part of this
//! workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;

pub use memory::MemoryStore;
