//! Core types for handlemint
//!
//! This module defines the foundational types:
//! - ObjectId: Unique identifier for repository objects
//! - ObjectKind: Discriminates items, collections, communities, ...
//! - Capabilities: Explicit capability tags carried by an object reference
//! - ObjectRef: The opaque view of a repository object seen by the engine
//! - Context: The caller's unit of work

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a repository object
///
/// An ObjectId is a wrapper around a UUID v4. The engine never looks inside
/// it; it is only compared, hashed and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new random ObjectId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an ObjectId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse an ObjectId from a string representation
    ///
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this ObjectId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of repository object
///
/// Only used for reporting. Behaviour is driven by [`Capabilities`], never
/// by matching on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A single archived work
    Item,
    /// A group of items
    Collection,
    /// A group of collections and sub-communities
    Community,
    /// The repository itself
    Site,
    /// A file attached to an item
    Bitstream,
}

impl ObjectKind {
    /// All object kinds (for iteration)
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Item,
        ObjectKind::Collection,
        ObjectKind::Community,
        ObjectKind::Site,
        ObjectKind::Bitstream,
    ];

    /// Human-readable display name
    pub const fn name(&self) -> &'static str {
        match self {
            ObjectKind::Item => "Item",
            ObjectKind::Collection => "Collection",
            ObjectKind::Community => "Community",
            ObjectKind::Site => "Site",
            ObjectKind::Bitstream => "Bitstream",
        }
    }

    /// Capabilities an object of this kind carries by default
    pub const fn default_capabilities(&self) -> Capabilities {
        match self {
            ObjectKind::Item => Capabilities::VERSIONED_CONTENT,
            ObjectKind::Collection | ObjectKind::Community => Capabilities::CONTENT,
            ObjectKind::Site | ObjectKind::Bitstream => Capabilities::NONE,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Capability tags carried explicitly by an object reference
///
/// - `versionable`: the object may belong to a version lineage, so explicit
///   handles with a `.N` suffix are checked against its version record.
/// - `described`: the object carries descriptive metadata whose
///   `dc.identifier.uri` field must mirror its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// May belong to a version lineage
    pub versionable: bool,
    /// Carries descriptive metadata
    pub described: bool,
}

impl Capabilities {
    /// No capabilities
    pub const NONE: Capabilities = Capabilities {
        versionable: false,
        described: false,
    };

    /// Descriptive metadata, no versioning
    pub const CONTENT: Capabilities = Capabilities {
        versionable: false,
        described: true,
    };

    /// Descriptive metadata and versioning
    pub const VERSIONED_CONTENT: Capabilities = Capabilities {
        versionable: true,
        described: true,
    };
}

/// Reference to a repository object as seen by the engine
///
/// The engine treats objects opaquely: it reads the id for registry and
/// history lookups, the kind for error reporting, and the capability tags
/// for every branching decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object identifier
    pub id: ObjectId,
    /// Object kind (reporting only)
    pub kind: ObjectKind,
    /// Capability tags
    pub capabilities: Capabilities,
}

impl ObjectRef {
    /// Create a reference with the kind's default capabilities
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            capabilities: kind.default_capabilities(),
        }
    }

    /// Create a reference with explicit capabilities
    pub fn with_capabilities(id: ObjectId, kind: ObjectKind, capabilities: Capabilities) -> Self {
        Self {
            id,
            kind,
            capabilities,
        }
    }

    /// New item with a fresh id
    pub fn item() -> Self {
        Self::new(ObjectId::new(), ObjectKind::Item)
    }

    /// New collection with a fresh id
    pub fn collection() -> Self {
        Self::new(ObjectId::new(), ObjectKind::Collection)
    }

    /// New community with a fresh id
    pub fn community() -> Self {
        Self::new(ObjectId::new(), ObjectKind::Community)
    }

    /// Whether explicit versioned handles are checked against lineage state
    #[inline]
    pub const fn is_versionable(&self) -> bool {
        self.capabilities.versionable
    }

    /// Whether the handle must be mirrored into descriptive metadata
    #[inline]
    pub const fn is_described(&self) -> bool {
        self.capabilities.described
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// The caller's unit of work
///
/// One context per logical request. Collaborators use it to scope their
/// transactions and authorization; the engine records it on log events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Request identifier for log correlation
    pub request_id: Uuid,
    /// Acting principal, if authenticated
    pub actor: Option<String>,
}

impl Context {
    /// Anonymous context with a fresh request id
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor: None,
        }
    }

    /// Context acting on behalf of `actor`
    pub fn for_actor(actor: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor: Some(actor.into()),
        }
    }

    /// Actor name for log output ("anonymous" when unauthenticated)
    pub fn actor_name(&self) -> &str {
        self.actor.as_deref().unwrap_or("anonymous")
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
