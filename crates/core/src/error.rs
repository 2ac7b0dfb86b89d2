//! Error types for the loam catalog
//!
//! One error enum serves the whole workspace. We use `thiserror` for
//! automatic `Display` and `Error` trait implementations.
//!
//! Validation errors (`DuplicateItem`, `InvalidParent`, `StructureViolation`)
//! are raised before any storage statement is issued, so a failed operation
//! never leaves a partial write behind. `Storage` wraps adapter failures
//! without leaking backend-specific detail into callers.

use crate::tag::ValueType;
use crate::types::{ItemId, ItemKind, VersionId};
use std::fmt;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the loam catalog
#[derive(Debug, Error)]
pub enum Error {
    /// Lookup by source key or id found no item
    #[error("{kind} not found: {key}")]
    ItemNotFound {
        /// Kind of the item that was looked up
        kind: ItemKind,
        /// The source key or id that failed to resolve
        key: String,
    },

    /// Lookup by version id found nothing
    #[error("version not found: {0}")]
    VersionNotFound(VersionId),

    /// An item with this source key already exists for the kind
    #[error("{kind} already exists: {source_key}")]
    DuplicateItem {
        /// Kind of the item being created
        kind: ItemKind,
        /// The conflicting source key
        source_key: String,
    },

    /// A declared parent version is not a member of the item's DAG
    #[error("parent {parent} is not in item {item}")]
    InvalidParent {
        /// The offending parent version id
        parent: VersionId,
        /// The item whose DAG was checked
        item: ItemId,
    },

    /// A rich version's tags fail conformance against its structure version
    #[error("structure violation on tag {key}: {violation}")]
    StructureViolation {
        /// The offending tag key
        key: String,
        /// What went wrong for that key
        violation: Violation,
    },

    /// Opaque wrapper around a backing-store error
    #[error("storage error: {0}")]
    Storage(String),

    /// An internal precondition did not hold
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Construct a storage error from any displayable cause
    pub fn storage(msg: impl fmt::Display) -> Self {
        Error::Storage(msg.to_string())
    }

    /// True for the two not-found variants
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ItemNotFound { .. } | Error::VersionNotFound(_))
    }
}

/// How a tag failed structure conformance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The required tag key is absent
    MissingTag,
    /// The tag exists but carries no typed value
    UntypedTag,
    /// The tag's value type differs from the declared attribute type
    WrongType {
        /// Type required by the structure attribute
        expected: ValueType,
        /// Type the candidate tag actually carries
        actual: ValueType,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingTag => write!(f, "required tag is missing"),
            Violation::UntypedTag => write!(f, "tag has no typed value"),
            Violation::WrongType { expected, actual } => {
                write!(f, "expected {} but found {}", expected, actual)
            }
        }
    }
}
