//! In-memory identifier registry
//!
//! Holds the handle ↔ object binding table behind a single
//! `parking_lot::RwLock`, so every bind is an atomic check-and-insert.
//!
//! ## Retired handles
//!
//! Unbinding keeps the handle string in the table with no holder. Retired
//! strings resolve to nothing, are skipped by generation, and may be bound
//! again explicitly.
//!
//! ## Usage
//!
//! ```rust
//! use handlemint_core::{Context, IdentifierRegistry, ObjectRef};
//! use handlemint_storage::InMemoryRegistry;
//!
//! let registry = InMemoryRegistry::new("123456789", "http://hdl.handle.net/");
//! let ctx = Context::new();
//! let item = ObjectRef::item();
//!
//! let handle = registry.create_generated(&ctx, &item).unwrap();
//! assert_eq!(handle, "123456789/1");
//! assert_eq!(registry.resolve(&ctx, &handle).unwrap(), Some(item));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use handlemint_core::identifier::{normalize, resolvable_form};
use handlemint_core::{Context, Error, IdentifierRegistry, ObjectId, ObjectRef, Result};

/// Binding table guarded by one lock
#[derive(Debug, Default)]
struct Bindings {
    /// Handle → holder; `None` marks a retired handle
    by_handle: HashMap<String, Option<ObjectRef>>,
    /// Object → its single handle
    by_object: HashMap<ObjectId, String>,
    /// Next candidate for generated suffixes
    next_suffix: u64,
}

/// Registry backed by in-process hash maps
#[derive(Debug)]
pub struct InMemoryRegistry {
    prefix: String,
    canonical_prefix: String,
    bindings: RwLock<Bindings>,
    /// Successful binding mutations, for observing write amplification
    writes: AtomicU64,
}

impl InMemoryRegistry {
    /// Create an empty registry minting under `prefix`
    ///
    /// `canonical_prefix` is prepended to handles to form their resolvable
    /// representation, and stripped again by [`parse_handle`].
    ///
    /// [`parse_handle`]: IdentifierRegistry::parse_handle
    pub fn new(prefix: impl Into<String>, canonical_prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            canonical_prefix: canonical_prefix.into(),
            bindings: RwLock::new(Bindings {
                next_suffix: 1,
                ..Bindings::default()
            }),
            writes: AtomicU64::new(0),
        }
    }

    /// Prefix used for generated handles
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of successful bind/unbind mutations so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Number of currently bound handles
    pub fn bound_count(&self) -> usize {
        self.bindings.read().by_object.len()
    }

    /// Whether `handle` was bound once and has since been released
    pub fn is_retired(&self, handle: &str) -> bool {
        matches!(self.bindings.read().by_handle.get(handle), Some(None))
    }

    fn bind(bindings: &mut Bindings, object: &ObjectRef, handle: &str) {
        bindings
            .by_handle
            .insert(handle.to_string(), Some(*object));
        bindings.by_object.insert(object.id, handle.to_string());
    }
}

impl IdentifierRegistry for InMemoryRegistry {
    fn create_generated(&self, _ctx: &Context, object: &ObjectRef) -> Result<String> {
        let mut bindings = self.bindings.write();
        if let Some(existing) = bindings.by_object.get(&object.id) {
            return Err(Error::ObjectAlreadyBound {
                object: object.id,
                existing: existing.clone(),
            });
        }

        // Skip anything bound or retired, including explicitly registered
        // strings that happen to look generated.
        let handle = loop {
            let candidate = format!("{}/{}", self.prefix, bindings.next_suffix);
            bindings.next_suffix += 1;
            if !bindings.by_handle.contains_key(&candidate) {
                break candidate;
            }
        };

        Self::bind(&mut bindings, object, &handle);
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(target: "handlemint::registry", object = %object.id, handle = %handle, "Generated handle bound");
        Ok(handle)
    }

    fn create_explicit(&self, _ctx: &Context, object: &ObjectRef, handle: &str) -> Result<String> {
        let mut bindings = self.bindings.write();
        if let Some(existing) = bindings.by_object.get(&object.id) {
            if existing == handle {
                return Ok(handle.to_string());
            }
            return Err(Error::ObjectAlreadyBound {
                object: object.id,
                existing: existing.clone(),
            });
        }
        if let Some(Some(holder)) = bindings.by_handle.get(handle) {
            return Err(Error::AlreadyBound {
                handle: handle.to_string(),
                holder: holder.id,
            });
        }

        Self::bind(&mut bindings, object, handle);
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(target: "handlemint::registry", object = %object.id, handle = %handle, "Explicit handle bound");
        Ok(handle.to_string())
    }

    fn resolve(&self, _ctx: &Context, handle: &str) -> Result<Option<ObjectRef>> {
        Ok(self.bindings.read().by_handle.get(handle).copied().flatten())
    }

    fn find_handle(&self, _ctx: &Context, object: &ObjectRef) -> Result<Option<String>> {
        Ok(self.bindings.read().by_object.get(&object.id).cloned())
    }

    fn unbind(&self, _ctx: &Context, object: &ObjectRef) -> Result<()> {
        let mut bindings = self.bindings.write();
        if let Some(handle) = bindings.by_object.remove(&object.id) {
            bindings.by_handle.insert(handle.clone(), None);
            self.writes.fetch_add(1, Ordering::Relaxed);
            debug!(target: "handlemint::registry", object = %object.id, handle = %handle, "Handle unbound");
        }
        Ok(())
    }

    fn parse_handle(&self, text: &str) -> Option<String> {
        normalize(text, &self.canonical_prefix)
    }

    fn canonical_form(&self, handle: &str) -> String {
        resolvable_form(&self.canonical_prefix, handle)
    }
}
