//! Error types for the minting engine.
//!
//! All failures of an engine operation are represented by the [`Error`]
//! enum. Errors are:
//! - **Structured**: each variant names the object id and kind it concerns
//! - **Final**: nothing here is retried or auto-corrected by the engine
//!
//! # Categories
//!
//! | Category | Variants | Description |
//! |----------|----------|-------------|
//! | Version inconsistency | `VersionNumberMismatch`, `VersionRecordMissing`, `DuplicateVersionedIdentifier`, `LineageUnbound` | Registry and history disagree |
//! | Binding | `AlreadyBound`, `ObjectAlreadyBound`, `InvalidHandle` | Uniqueness of handle ↔ object, explicit handle text |
//! | Lookup | `NotFound`, `NotResolvable`, `ResolveFailed` | Lookup and resolution outcomes |
//! | Authorization | `Unauthorized` | Metadata store refused the write |
//! | System | `Store`, `VersioningDisabled`, `Config` | Collaborator or setup failures |

use std::fmt;

use handlemint_core::{HistoryId, ObjectId, ObjectKind, ObjectRef, VersionNumber};

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine operation, recorded on wrapped errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Mint a handle
    Mint,
    /// Register a handle (implicit or explicit)
    Register,
    /// Reserve a handle
    Reserve,
    /// Resolve a handle to an object
    Resolve,
    /// Look up an object's handle
    Lookup,
    /// Unbind an object's handle
    Delete,
    /// Restore a versioned handle and its version record
    Restore,
    /// Rewrite the identifier metadata field
    Synchronize,
}

impl Operation {
    /// Short name for messages and log fields
    pub const fn name(&self) -> &'static str {
        match self {
            Operation::Mint => "mint",
            Operation::Register => "register",
            Operation::Reserve => "reserve",
            Operation::Resolve => "resolve",
            Operation::Lookup => "lookup",
            Operation::Delete => "delete",
            Operation::Restore => "restore",
            Operation::Synchronize => "synchronize",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Minting engine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // ==================== Version Inconsistency ====================
    /// Explicit handle encodes a different version than the object's record
    #[error("{kind} {object}: handle '{handle}' encodes version {requested}, but the object is version {actual}")]
    VersionNumberMismatch {
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Handle involved
        handle: String,
        /// Version encoded in the handle
        requested: VersionNumber,
        /// Version recorded for the object
        actual: VersionNumber,
    },

    /// A history exists for the lineage but the object has no record in it
    #[error("{kind} {object} has no version record in history {history}")]
    VersionRecordMissing {
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Lineage of the object
        history: HistoryId,
    },

    /// The derived versioned handle already resolves to another object
    #[error("versioned handle '{handle}' for {kind} {object} (version {version}) is already bound to {holder}")]
    DuplicateVersionedIdentifier {
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Handle involved
        handle: String,
        /// Version the handle was derived for
        version: VersionNumber,
        /// Object currently holding the handle
        holder: ObjectId,
    },

    /// The lineage's first version has no handle to derive from
    #[error("first version {first} of history {history} has no handle; cannot derive one for {kind} {object}")]
    LineageUnbound {
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Lineage of the object
        history: HistoryId,
        /// First version of the lineage
        first: ObjectId,
    },

    // ==================== Binding ====================
    /// The handle is held by another object
    #[error("handle '{handle}' is already bound to {holder}; cannot bind {kind} {object}")]
    AlreadyBound {
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Handle involved
        handle: String,
        /// Object currently holding the handle
        holder: ObjectId,
    },

    /// The object already holds a different handle
    #[error("{kind} {object} is already bound to handle '{existing}'")]
    ObjectAlreadyBound {
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Handle the object already holds
        existing: String,
    },

    /// Caller-supplied text is not a handle in any accepted spelling
    #[error("{operation} of {kind} {object}: '{input}' is not a handle")]
    InvalidHandle {
        /// Operation that failed
        operation: Operation,
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Text as supplied
        input: String,
    },

    // ==================== Lookup ====================
    /// The object has no handle
    #[error("no handle bound to {kind} {object}")]
    NotFound {
        /// Object that was looked up
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
    },

    /// The registry failed while looking up the object's handle
    #[error("handle of {kind} {object} is not resolvable: {source}")]
    NotResolvable {
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Underlying collaborator error
        #[source]
        source: handlemint_core::Error,
    },

    /// The registry failed while resolving a handle
    #[error("failed to resolve handle '{handle}': {source}")]
    ResolveFailed {
        /// Handle involved
        handle: String,
        /// Underlying collaborator error
        #[source]
        source: handlemint_core::Error,
    },

    // ==================== Authorization ====================
    /// The metadata store refused the write
    #[error("{operation} of {kind} {object} not authorized: {reason}")]
    Unauthorized {
        /// Operation that failed
        operation: Operation,
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Reason reported by the store
        reason: String,
    },

    // ==================== System ====================
    /// A collaborator failed
    #[error("{operation} failed for {kind} {object}: {source}")]
    Store {
        /// Operation that failed
        operation: Operation,
        /// Object the operation concerned
        object: ObjectId,
        /// Kind of that object
        kind: ObjectKind,
        /// Underlying collaborator error
        #[source]
        source: handlemint_core::Error,
    },

    /// The engine was configured while versioning is turned off
    #[error("versioned handle minting requires versioning, but versioning is disabled")]
    VersioningDisabled,

    /// Configuration could not be read or is invalid
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a collaborator failure with operation and object context
    ///
    /// Authorization and binding conflicts keep their own variants so the
    /// caller can map them without inspecting the source.
    pub fn store(operation: Operation, object: &ObjectRef, source: handlemint_core::Error) -> Self {
        use handlemint_core::Error as Core;
        match source {
            Core::Unauthorized(reason) => Error::Unauthorized {
                operation,
                object: object.id,
                kind: object.kind,
                reason,
            },
            Core::AlreadyBound { handle, holder } => Error::AlreadyBound {
                object: object.id,
                kind: object.kind,
                handle,
                holder,
            },
            Core::ObjectAlreadyBound { existing, .. } => Error::ObjectAlreadyBound {
                object: object.id,
                kind: object.kind,
                existing,
            },
            source => Error::Store {
                operation,
                object: object.id,
                kind: object.kind,
                source,
            },
        }
    }

    /// Construct a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether registry and version history disagree
    pub fn is_version_inconsistency(&self) -> bool {
        matches!(
            self,
            Error::VersionNumberMismatch { .. }
                | Error::VersionRecordMissing { .. }
                | Error::DuplicateVersionedIdentifier { .. }
                | Error::LineageUnbound { .. }
        )
    }

    /// Whether this maps to an access-denied response
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }

    /// Object the error concerns, if any
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            Error::VersionNumberMismatch { object, .. }
            | Error::VersionRecordMissing { object, .. }
            | Error::DuplicateVersionedIdentifier { object, .. }
            | Error::LineageUnbound { object, .. }
            | Error::AlreadyBound { object, .. }
            | Error::ObjectAlreadyBound { object, .. }
            | Error::InvalidHandle { object, .. }
            | Error::NotFound { object, .. }
            | Error::NotResolvable { object, .. }
            | Error::Unauthorized { object, .. }
            | Error::Store { object, .. } => Some(*object),
            Error::ResolveFailed { .. } | Error::VersioningDisabled | Error::Config(_) => None,
        }
    }
}
