//! handlemint - Versioned persistent-identifier minting and resolution
//!
//! handlemint assigns, records, resolves and retires handles
//! (`prefix/suffix[.version]`) for repository objects that may exist in
//! several successive versions, and keeps each object's identifier metadata
//! pointing at its current handle.
//!
//! # Quick Start
//!
//! ```
//! use handlemint::{Context, HandleConfig, MintingEngine, ObjectRef};
//!
//! // Engine over in-memory stores
//! let (engine, _backends) = MintingEngine::ephemeral(HandleConfig::with_prefix("10673"))?;
//! let ctx = Context::new();
//!
//! let item = ObjectRef::item();
//! let handle = engine.mint(&ctx, &item)?;
//! assert_eq!(handle, "10673/1");
//!
//! // Any accepted spelling resolves
//! let found = engine.resolve(&ctx, "http://hdl.handle.net/10673/1")?;
//! assert_eq!(found, Some(item));
//! # Ok::<(), handlemint::Error>(())
//! ```
//!
//! # Architecture
//!
//! The [`MintingEngine`] talks to three collaborators through the traits
//! [`IdentifierRegistry`], [`VersionHistoryStore`] and [`MetadataStore`].
//! The `storage` module provides in-memory implementations; production
//! deployments supply their own.

// Re-export the public API from handlemint-engine
pub use handlemint_engine::*;

pub use handlemint_core::identifier::{
    handle_from_url, normalize, strip_version_suffix, version_suffix, versioned_form,
};
pub use handlemint_core::{
    Capabilities, Context, Handle, HandleParseError, HistoryId, IdentifierRegistry, MetadataField,
    MetadataStore, MetadataValue, ObjectId, ObjectKind, ObjectRef, Version, VersionHistory,
    VersionHistoryStore, VersionNumber, CONFIDENCE_UNSET,
};

/// In-memory collaborator implementations
pub mod storage {
    pub use handlemint_storage::{InMemoryHistoryStore, InMemoryMetadataStore, InMemoryRegistry};
}

/// Collaborator error type returned by trait implementations
pub use handlemint_core::Error as StoreError;
