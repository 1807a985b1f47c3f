//! Identifier metadata synchronization
//!
//! Keeps `dc.identifier.uri` of a described object in step with its bound
//! handle. Values the registry recognizes as handles (in any spelling) are
//! replaced by the resolvable form of the current handle; every other value
//! is written back unchanged and in its original order.

use std::sync::Arc;

use tracing::debug;

use handlemint_core::{
    Context, IdentifierRegistry, MetadataField, MetadataStore, MetadataValue, ObjectRef,
};

use crate::error::{Error, Operation, Result};

/// Rewrites the identifier field of described objects
#[derive(Clone)]
pub struct MetadataSynchronizer {
    metadata: Arc<dyn MetadataStore>,
    registry: Arc<dyn IdentifierRegistry>,
}

impl MetadataSynchronizer {
    /// Create a synchronizer over the given stores
    pub fn new(metadata: Arc<dyn MetadataStore>, registry: Arc<dyn IdentifierRegistry>) -> Self {
        Self { metadata, registry }
    }

    /// Make `handle` the only handle-shaped value of the identifier field
    ///
    /// A blank `handle` removes all handle-shaped values without adding one.
    ///
    /// # Errors
    ///
    /// `Error::Unauthorized` if the metadata store refuses the update,
    /// `Error::Store` for any other store failure.
    pub fn synchronize(&self, ctx: &Context, object: &ObjectRef, handle: &str) -> Result<()> {
        let field = MetadataField::IDENTIFIER_URI;
        let wrap = |e| Error::store(Operation::Synchronize, object, e);

        let existing = self.metadata.get_field(ctx, object, field).map_err(wrap)?;
        self.metadata.clear_field(ctx, object, field).map_err(wrap)?;

        for value in existing {
            if self.registry.parse_handle(&value.value).is_some() {
                debug!(target: "handlemint::sync", object = %object.id, value = %value.value, "Removing identifier");
                continue;
            }
            debug!(target: "handlemint::sync", object = %object.id, value = %value.value, "Preserving identifier");
            self.metadata
                .add_value(ctx, object, field, value)
                .map_err(wrap)?;
        }

        let resolvable = self.registry.canonical_form(handle);
        if !resolvable.trim().is_empty() {
            self.metadata
                .add_value(ctx, object, field, MetadataValue::plain(resolvable))
                .map_err(wrap)?;
        }

        self.metadata.persist(ctx, object).map_err(wrap)?;
        debug!(
            target: "handlemint::sync",
            request = %ctx.request_id,
            object = %object.id,
            handle = %handle,
            "Identifier metadata synchronized"
        );
        Ok(())
    }
}

impl std::fmt::Debug for MetadataSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataSynchronizer").finish_non_exhaustive()
    }
}
