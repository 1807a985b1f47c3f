//! Collaborator traits
//!
//! This module defines the three narrow contracts the minting engine depends
//! on: the identifier registry, the version-history store and the metadata
//! store. Implementations are assumed transactional within the caller's
//! [`Context`]; the engine never retries a failed call.
//!
//! In-memory implementations live in `handlemint-storage`.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::history::{Version, VersionHistory};
use crate::identifier::VersionNumber;
use crate::metadata::{MetadataField, MetadataValue};
use crate::types::{Context, ObjectRef};

/// Identifier registry: the authoritative handle ↔ object binding table
///
/// A handle string is bound to at most one object, and an object holds at
/// most one handle. Unbound strings stay reserved: generation never hands
/// them out again, though they can be re-bound explicitly.
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait IdentifierRegistry: Send + Sync {
    /// Bind a freshly generated handle under the registry's prefix
    ///
    /// # Errors
    ///
    /// Returns `ObjectAlreadyBound` if the object already holds a handle, or
    /// a storage error.
    fn create_generated(&self, ctx: &Context, object: &ObjectRef) -> Result<String>;

    /// Bind `handle` to the object
    ///
    /// Succeeds without change if the pair is already bound.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyBound` if another object holds `handle`,
    /// `ObjectAlreadyBound` if the object holds a different handle, or a
    /// storage error.
    fn create_explicit(&self, ctx: &Context, object: &ObjectRef, handle: &str) -> Result<String>;

    /// Object currently bound to `handle`
    ///
    /// `handle` must already be in canonical form (see [`parse_handle`]).
    ///
    /// [`parse_handle`]: IdentifierRegistry::parse_handle
    fn resolve(&self, ctx: &Context, handle: &str) -> Result<Option<ObjectRef>>;

    /// Handle currently bound to the object
    fn find_handle(&self, ctx: &Context, object: &ObjectRef) -> Result<Option<String>>;

    /// Release the object's handle, if any
    ///
    /// Unbinding an unbound object is a no-op.
    fn unbind(&self, ctx: &Context, object: &ObjectRef) -> Result<()>;

    /// The registry's own parser: canonical handle string for any accepted
    /// spelling, or `None` if `text` is not a handle
    fn parse_handle(&self, text: &str) -> Option<String>;

    /// Fully-qualified resolvable form of a handle (e.g. a resolver URL)
    fn canonical_form(&self, handle: &str) -> String;
}

/// Version-history store: lineage persistence
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait VersionHistoryStore: Send + Sync {
    /// History the object belongs to, if any
    fn find_history(&self, ctx: &Context, object: &ObjectRef) -> Result<Option<VersionHistory>>;

    /// Create an empty history
    fn create_history(&self, ctx: &Context) -> Result<VersionHistory>;

    /// Create a history whose only record is `object` at version `number`
    ///
    /// Both are written as one step: on success [`find_history`] finds the
    /// new history for `object`, on failure nothing is left behind.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if `object` already belongs to a history.
    ///
    /// [`find_history`]: VersionHistoryStore::find_history
    fn start_history(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        summary: &str,
        created_at: DateTime<Utc>,
        number: VersionNumber,
    ) -> Result<(VersionHistory, Version)>;

    /// Version record of `object` within `history`
    fn find_version(
        &self,
        ctx: &Context,
        history: &VersionHistory,
        object: &ObjectRef,
    ) -> Result<Option<Version>>;

    /// Lowest-numbered version of `history`
    fn first_version(&self, ctx: &Context, history: &VersionHistory) -> Result<Option<Version>>;

    /// Record `object` as a version of `history`
    ///
    /// With `number` the record gets exactly that number; without it the
    /// next sequential number is assigned. The record is added to `history`
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateVersion` if the number is taken.
    fn create_version(
        &self,
        ctx: &Context,
        history: &mut VersionHistory,
        object: &ObjectRef,
        summary: &str,
        created_at: DateTime<Utc>,
        number: Option<VersionNumber>,
    ) -> Result<Version>;

    /// Persist the history after mutation
    fn persist(&self, ctx: &Context, history: &VersionHistory) -> Result<()>;
}

/// Metadata store: field-level access to an object's descriptive record
///
/// Writes are staged until [`persist`]; a failed persist leaves the
/// committed record unchanged.
///
/// [`persist`]: MetadataStore::persist
pub trait MetadataStore: Send + Sync {
    /// All values of `field`, in stored order
    fn get_field(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        field: MetadataField,
    ) -> Result<Vec<MetadataValue>>;

    /// Remove every value of `field`
    fn clear_field(&self, ctx: &Context, object: &ObjectRef, field: MetadataField) -> Result<()>;

    /// Append a value to `field`
    fn add_value(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        field: MetadataField,
        value: MetadataValue,
    ) -> Result<()>;

    /// Commit staged changes
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the acting principal may not modify the
    /// object.
    fn persist(&self, ctx: &Context, object: &ObjectRef) -> Result<()>;
}
