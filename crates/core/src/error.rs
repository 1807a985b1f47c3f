//! Error types for handlemint collaborators
//!
//! This module defines the errors reported by the identifier registry, the
//! version-history store and the metadata store. The engine wraps these with
//! operation and object context before handing them to its caller.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::history::HistoryId;
use crate::identifier::VersionNumber;
use crate::types::ObjectId;
use thiserror::Error;

/// Result type alias for collaborator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the storage collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The handle string is already bound to another object
    #[error("handle '{handle}' is already bound to object {holder}")]
    AlreadyBound {
        /// Handle that was requested
        handle: String,
        /// Object currently holding it
        holder: ObjectId,
    },

    /// The object already has a different handle
    #[error("object {object} is already bound to handle '{existing}'")]
    ObjectAlreadyBound {
        /// Object that was to be bound
        object: ObjectId,
        /// Handle it already holds
        existing: String,
    },

    /// The acting principal may not perform the write
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// A version with this number already exists in the history
    #[error("version {number} already exists in history {history}")]
    DuplicateVersion {
        /// History being extended
        history: HistoryId,
        /// Conflicting version number
        number: VersionNumber,
    },

    /// The history does not exist in the store
    #[error("history {0} not found")]
    HistoryNotFound(HistoryId),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Backend storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Construct a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Construct an authorization error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Error::Unauthorized(msg.into())
    }

    /// Whether this is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }
}
