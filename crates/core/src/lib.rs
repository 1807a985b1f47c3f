//! Core types and traits for handlemint
//!
//! This crate defines the foundational types used throughout the system:
//! - Handle: Structured `prefix/suffix[.version]` identifier and its grammar
//! - ObjectRef: Opaque repository object reference with capability tags
//! - VersionHistory / Version: Lineage records
//! - MetadataField / MetadataValue: Descriptive metadata
//! - Error: Collaborator error type
//! - Traits: IdentifierRegistry, VersionHistoryStore, MetadataStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod history;
pub mod identifier;
pub mod metadata;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use history::{HistoryId, Version, VersionHistory};
pub use identifier::{Handle, HandleParseError, VersionNumber};
pub use metadata::{MetadataField, MetadataValue, CONFIDENCE_UNSET};
pub use traits::{IdentifierRegistry, MetadataStore, VersionHistoryStore};
pub use types::{Capabilities, Context, ObjectId, ObjectKind, ObjectRef};
