//! Versioned handle minting engine
//!
//! The engine decides which handle an object gets and keeps three stores in
//! step: the identifier registry, the version history and the object's
//! descriptive metadata.
//!
//! ## Handle shape
//!
//! The first version of a lineage holds a plain handle (`123456789/100`), so
//! repositories that turn versioning on later keep their existing handles.
//! Version N > 1 holds the first version's handle with `.N` appended
//! (`123456789/100.3`).
//!
//! ## Failure model
//!
//! Every collaborator call runs inside the caller's [`Context`]. A failure is
//! logged once, wrapped with the operation and object, and returned; nothing
//! is retried and nothing is rolled back here. The caller owns the unit of
//! work and decides whether to commit it.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use handlemint_core::identifier::{strip_version_suffix, version_suffix, versioned_form};
use handlemint_core::{
    Context, IdentifierRegistry, MetadataStore, ObjectRef, Version, VersionHistory,
    VersionHistoryStore, VersionNumber,
};
use handlemint_storage::{InMemoryHistoryStore, InMemoryMetadataStore, InMemoryRegistry};

use crate::config::{HandleConfig, PrefixSource};
use crate::error::{Error, Operation, Result};
use crate::synchronizer::MetadataSynchronizer;

/// Summary recorded on version records re-created from an explicit handle
pub const RESTORE_SUMMARY: &str = "Restored from external identifier";

/// How an explicit handle gets registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationPath {
    /// Bind the canonical string, no lineage checks
    Plain,
    /// The object's version record carries the handle's version
    KnownVersion(Version),
    /// The object has no lineage yet; re-create it at this version
    Restore(VersionNumber),
}

/// In-memory stores behind an ephemeral engine
#[derive(Debug, Clone)]
pub struct InMemoryBackends {
    /// Identifier registry
    pub registry: Arc<InMemoryRegistry>,
    /// Version-history store
    pub history: Arc<InMemoryHistoryStore>,
    /// Metadata store
    pub metadata: Arc<InMemoryMetadataStore>,
}

/// Wraps a collaborator failure for `operation`, logging it once
fn failed<'a>(
    ctx: &'a Context,
    operation: Operation,
    object: &'a ObjectRef,
) -> impl Fn(handlemint_core::Error) -> Error + 'a {
    move |source| {
        error!(
            target: "handlemint::engine",
            request = %ctx.request_id,
            operation = %operation,
            object = %object.id,
            kind = %object.kind,
            error = %source,
            "Identifier operation failed"
        );
        Error::store(operation, object, source)
    }
}

/// Versioned handle minting engine
///
/// Holds its collaborators as trait objects, so one engine can be shared
/// across request threads. All methods take the caller's [`Context`].
pub struct MintingEngine {
    config: HandleConfig,
    prefix: String,
    prefix_source: PrefixSource,
    registry: Arc<dyn IdentifierRegistry>,
    history: Arc<dyn VersionHistoryStore>,
    synchronizer: MetadataSynchronizer,
}

impl MintingEngine {
    /// Create an engine over the given collaborators
    ///
    /// # Errors
    ///
    /// `Error::VersioningDisabled` if `config.versioning_enabled` is false,
    /// `Error::Config` if the configured prefix is malformed.
    pub fn new(
        config: HandleConfig,
        registry: Arc<dyn IdentifierRegistry>,
        history: Arc<dyn VersionHistoryStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Result<Self> {
        let (prefix, prefix_source) = Self::prepare(&config)?;
        Ok(Self::assemble(
            config,
            prefix,
            prefix_source,
            registry,
            history,
            metadata,
        ))
    }

    /// Create an engine over fresh in-memory stores
    ///
    /// The registry mints under the configured prefix (or the fallback).
    /// The returned backends give direct access to the stores for
    /// inspection.
    pub fn ephemeral(config: HandleConfig) -> Result<(Self, InMemoryBackends)> {
        let (prefix, prefix_source) = Self::prepare(&config)?;
        let backends = InMemoryBackends {
            registry: Arc::new(InMemoryRegistry::new(
                prefix.clone(),
                config.canonical_prefix.clone(),
            )),
            history: Arc::new(InMemoryHistoryStore::new()),
            metadata: Arc::new(InMemoryMetadataStore::new()),
        };
        let engine = Self::assemble(
            config,
            prefix,
            prefix_source,
            backends.registry.clone(),
            backends.history.clone(),
            backends.metadata.clone(),
        );
        Ok((engine, backends))
    }

    fn prepare(config: &HandleConfig) -> Result<(String, PrefixSource)> {
        if !config.versioning_enabled {
            error!(
                target: "handlemint::config",
                "Versioned handles are enabled, but versioning is disabled"
            );
            return Err(Error::VersioningDisabled);
        }
        config.validate()?;
        Ok(config.resolve_prefix())
    }

    fn assemble(
        config: HandleConfig,
        prefix: String,
        prefix_source: PrefixSource,
        registry: Arc<dyn IdentifierRegistry>,
        history: Arc<dyn VersionHistoryStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        info!(
            target: "handlemint::engine",
            prefix = %prefix,
            source = ?prefix_source,
            "Minting engine ready"
        );
        Self {
            synchronizer: MetadataSynchronizer::new(metadata, registry.clone()),
            config,
            prefix,
            prefix_source,
            registry,
            history,
        }
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    /// Effective naming authority
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the prefix was configured or is the fallback
    pub fn prefix_source(&self) -> PrefixSource {
        self.prefix_source
    }

    // ========================================================================
    // Minting
    // ========================================================================

    /// Return the object's handle, binding one first if it has none
    ///
    /// An already-bound object is returned as is, with no writes. Otherwise
    /// a versionable object with a lineage gets a handle derived from the
    /// lineage's first version, and everything else gets a generated one.
    /// Metadata of described objects is synchronized after a fresh bind.
    pub fn mint(&self, ctx: &Context, object: &ObjectRef) -> Result<String> {
        let (handle, minted) = self.find_or_bind(ctx, object, Operation::Mint)?;
        if minted && object.is_described() {
            self.synchronizer.synchronize(ctx, object, &handle)?;
        }
        Ok(handle)
    }

    /// Mint, then synchronize metadata of described objects unconditionally
    ///
    /// Unlike [`mint`](Self::mint), this also repairs stale identifier
    /// metadata of objects that were already bound.
    pub fn register(&self, ctx: &Context, object: &ObjectRef) -> Result<String> {
        let (handle, _) = self.find_or_bind(ctx, object, Operation::Register)?;
        if object.is_described() {
            self.synchronizer.synchronize(ctx, object, &handle)?;
        }
        Ok(handle)
    }

    fn find_or_bind(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        operation: Operation,
    ) -> Result<(String, bool)> {
        let wrap = failed(ctx, operation, object);
        if let Some(existing) = self.registry.find_handle(ctx, object).map_err(&wrap)? {
            debug!(
                target: "handlemint::engine",
                request = %ctx.request_id,
                object = %object.id,
                handle = %existing,
                "Object already bound"
            );
            return Ok((existing, false));
        }

        let history = if object.is_versionable() {
            self.history.find_history(ctx, object).map_err(&wrap)?
        } else {
            None
        };
        let handle = match history {
            Some(history) => self.bind_from_history(ctx, object, &history, operation)?,
            None => self.registry.create_generated(ctx, object).map_err(&wrap)?,
        };

        info!(
            target: "handlemint::engine",
            request = %ctx.request_id,
            object = %object.id,
            kind = %object.kind,
            handle = %handle,
            "Handle minted"
        );
        Ok((handle, true))
    }

    /// Bind the lineage-derived handle for an unbound object
    fn bind_from_history(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        history: &VersionHistory,
        operation: Operation,
    ) -> Result<String> {
        let wrap = failed(ctx, operation, object);
        let missing = || Error::VersionRecordMissing {
            object: object.id,
            kind: object.kind,
            history: history.id(),
        };

        let version = self
            .history
            .find_version(ctx, history, object)
            .map_err(&wrap)?
            .ok_or_else(missing)?;
        let first = self
            .history
            .first_version(ctx, history)
            .map_err(&wrap)?
            .ok_or_else(missing)?;

        let first_object =
            ObjectRef::with_capabilities(first.object, object.kind, object.capabilities);
        let bare = match self.registry.find_handle(ctx, &first_object).map_err(&wrap)? {
            Some(handle) => strip_version_suffix(&handle).to_string(),
            // The object starts its own lineage
            None if first.object == object.id => {
                return self.registry.create_generated(ctx, object).map_err(&wrap);
            }
            None => {
                return Err(Error::LineageUnbound {
                    object: object.id,
                    kind: object.kind,
                    history: history.id(),
                    first: first.object,
                });
            }
        };

        let candidate = versioned_form(&bare, version.number);
        if let Some(holder) = self.registry.resolve(ctx, &candidate).map_err(&wrap)? {
            if holder.id != object.id {
                warn!(
                    target: "handlemint::engine",
                    request = %ctx.request_id,
                    object = %object.id,
                    holder = %holder.id,
                    handle = %candidate,
                    "Versioned handle already in use"
                );
                return Err(Error::DuplicateVersionedIdentifier {
                    object: object.id,
                    kind: object.kind,
                    handle: candidate,
                    version: version.number,
                    holder: holder.id,
                });
            }
        }

        debug!(
            target: "handlemint::engine",
            request = %ctx.request_id,
            object = %object.id,
            version = %version.number,
            handle = %candidate,
            "Derived versioned handle"
        );
        self.registry
            .create_explicit(ctx, object, &candidate)
            .map_err(&wrap)
    }

    // ========================================================================
    // Explicit registration
    // ========================================================================

    /// Register a caller-chosen handle for the object
    ///
    /// A handle with a version suffix on a versionable object is checked
    /// against the object's lineage: a matching version record is bound
    /// directly, a missing lineage is re-created at that version, and a
    /// disagreement fails without binding anything. Any spelling the
    /// registry accepts is bound in canonical form, which is returned.
    ///
    /// # Errors
    ///
    /// `Error::InvalidHandle` if `identifier` is not a handle.
    pub fn register_with(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        identifier: &str,
    ) -> Result<String> {
        let handle = self.canonical_handle(ctx, object, identifier, Operation::Register)?;
        match self.registration_path(ctx, object, identifier)? {
            RegistrationPath::Plain => {
                self.bind_explicit(ctx, object, &handle, Operation::Register)
            }
            RegistrationPath::KnownVersion(version) => {
                let handle = versioned_form(&handle, version.number);
                self.bind_explicit(ctx, object, &handle, Operation::Register)
            }
            RegistrationPath::Restore(number) => {
                let handle = versioned_form(&handle, number);
                self.restore(ctx, object, &handle, number)?;
                Ok(handle)
            }
        }
    }

    /// Canonical string of caller-supplied handle text
    fn canonical_handle(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        identifier: &str,
        operation: Operation,
    ) -> Result<String> {
        self.registry.parse_handle(identifier).ok_or_else(|| {
            warn!(
                target: "handlemint::engine",
                request = %ctx.request_id,
                operation = %operation,
                object = %object.id,
                input = %identifier,
                "Rejected text that is not a handle"
            );
            Error::InvalidHandle {
                operation,
                object: object.id,
                kind: object.kind,
                input: identifier.to_string(),
            }
        })
    }

    /// Decide how [`register_with`](Self::register_with) treats `identifier`
    ///
    /// Reads lineage state only; never writes. The version is taken from the
    /// canonical form, or is 1 when the text spells out a trailing `.1`.
    pub fn registration_path(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        identifier: &str,
    ) -> Result<RegistrationPath> {
        let handle = self.canonical_handle(ctx, object, identifier, Operation::Register)?;
        let requested = version_suffix(&handle).or_else(|| {
            version_suffix(identifier.trim()).filter(|number| number.is_first())
        });
        let requested = match requested {
            Some(number) if object.is_versionable() => number,
            _ => return Ok(RegistrationPath::Plain),
        };

        let wrap = failed(ctx, Operation::Register, object);
        let history = match self.history.find_history(ctx, object).map_err(&wrap)? {
            Some(history) => history,
            None => return Ok(RegistrationPath::Restore(requested)),
        };
        let version = self
            .history
            .find_version(ctx, &history, object)
            .map_err(&wrap)?
            .ok_or(Error::VersionRecordMissing {
                object: object.id,
                kind: object.kind,
                history: history.id(),
            })?;

        if version.number != requested {
            warn!(
                target: "handlemint::engine",
                request = %ctx.request_id,
                object = %object.id,
                handle = %identifier,
                requested = %requested,
                actual = %version.number,
                "Handle version does not match the object's version"
            );
            return Err(Error::VersionNumberMismatch {
                object: object.id,
                kind: object.kind,
                handle: identifier.to_string(),
                requested,
                actual: version.number,
            });
        }
        Ok(RegistrationPath::KnownVersion(version))
    }

    fn bind_explicit(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        handle: &str,
        operation: Operation,
    ) -> Result<String> {
        let bound = self
            .registry
            .create_explicit(ctx, object, handle)
            .map_err(failed(ctx, operation, object))?;
        if object.is_described() {
            self.synchronizer.synchronize(ctx, object, &bound)?;
        }
        info!(
            target: "handlemint::engine",
            request = %ctx.request_id,
            object = %object.id,
            kind = %object.kind,
            handle = %bound,
            "Handle registered"
        );
        Ok(bound)
    }

    /// Bind `handle` and record the object as version `number` of its lineage
    ///
    /// Each step checks for existing state first, so a retry after a partial
    /// failure completes the remaining steps.
    fn restore(
        &self,
        ctx: &Context,
        object: &ObjectRef,
        handle: &str,
        number: VersionNumber,
    ) -> Result<Version> {
        let wrap = failed(ctx, Operation::Restore, object);

        self.registry
            .create_explicit(ctx, object, handle)
            .map_err(&wrap)?;
        if object.is_described() {
            self.synchronizer.synchronize(ctx, object, handle)?;
        }

        // A new lineage is created together with its record, so a failure
        // never leaves a history the retry cannot find
        let (history, version) = match self.history.find_history(ctx, object).map_err(&wrap)? {
            Some(mut history) => {
                let version = match self
                    .history
                    .find_version(ctx, &history, object)
                    .map_err(&wrap)?
                {
                    Some(version) => version,
                    None => self
                        .history
                        .create_version(
                            ctx,
                            &mut history,
                            object,
                            RESTORE_SUMMARY,
                            Utc::now(),
                            Some(number),
                        )
                        .map_err(&wrap)?,
                };
                (history, version)
            }
            None => self
                .history
                .start_history(ctx, object, RESTORE_SUMMARY, Utc::now(), number)
                .map_err(&wrap)?,
        };
        self.history.persist(ctx, &history).map_err(&wrap)?;

        info!(
            target: "handlemint::engine",
            request = %ctx.request_id,
            object = %object.id,
            history = %history.id(),
            version = %version.number,
            handle = %handle,
            "Version restored from handle"
        );
        Ok(version)
    }

    /// Bind a caller-chosen handle without version checks or metadata writes
    ///
    /// The handle is bound in canonical form.
    ///
    /// # Errors
    ///
    /// `Error::InvalidHandle` if `identifier` is not a handle, otherwise any
    /// registry failure, including the handle being held by another object.
    pub fn reserve(&self, ctx: &Context, object: &ObjectRef, identifier: &str) -> Result<()> {
        let handle = self.canonical_handle(ctx, object, identifier, Operation::Reserve)?;
        self.registry
            .create_explicit(ctx, object, &handle)
            .map_err(failed(ctx, Operation::Reserve, object))?;
        info!(
            target: "handlemint::engine",
            request = %ctx.request_id,
            object = %object.id,
            handle = %handle,
            "Handle reserved"
        );
        Ok(())
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Object bound to `identifier`, in any spelling the registry accepts
    ///
    /// Text that is not a handle resolves to `Ok(None)`.
    pub fn resolve(&self, ctx: &Context, identifier: &str) -> Result<Option<ObjectRef>> {
        let handle = match self.registry.parse_handle(identifier) {
            Some(handle) => handle,
            None => {
                debug!(
                    target: "handlemint::engine",
                    request = %ctx.request_id,
                    input = %identifier,
                    "Not a handle"
                );
                return Ok(None);
            }
        };

        self.registry.resolve(ctx, &handle).map_err(|source| {
            error!(
                target: "handlemint::engine",
                request = %ctx.request_id,
                handle = %handle,
                error = %source,
                "Error while resolving handle"
            );
            Error::ResolveFailed {
                handle: handle.clone(),
                source,
            }
        })
    }

    /// Handle currently bound to the object
    ///
    /// # Errors
    ///
    /// `Error::NotFound` if the object is unbound, `Error::NotResolvable` if
    /// the registry fails.
    pub fn lookup(&self, ctx: &Context, object: &ObjectRef) -> Result<String> {
        match self.registry.find_handle(ctx, object) {
            Ok(Some(handle)) => Ok(handle),
            Ok(None) => Err(Error::NotFound {
                object: object.id,
                kind: object.kind,
            }),
            Err(source) => Err(Error::NotResolvable {
                object: object.id,
                kind: object.kind,
                source,
            }),
        }
    }

    /// Unbind the object's current handle
    ///
    /// The released string stays reserved in the registry.
    pub fn delete(&self, ctx: &Context, object: &ObjectRef) -> Result<()> {
        self.registry
            .unbind(ctx, object)
            .map_err(failed(ctx, Operation::Delete, object))?;
        info!(
            target: "handlemint::engine",
            request = %ctx.request_id,
            object = %object.id,
            "Handle unbound"
        );
        Ok(())
    }

    /// Same as [`delete`](Self::delete); `identifier` is not consulted
    pub fn delete_handle(&self, ctx: &Context, object: &ObjectRef, identifier: &str) -> Result<()> {
        debug!(
            target: "handlemint::engine",
            request = %ctx.request_id,
            object = %object.id,
            input = %identifier,
            "Deleting current handle"
        );
        self.delete(ctx, object)
    }

    /// Whether the registry recognizes `identifier` as a handle
    pub fn supports(&self, identifier: &str) -> bool {
        self.registry.parse_handle(identifier).is_some()
    }
}

impl fmt::Debug for MintingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintingEngine")
            .field("prefix", &self.prefix)
            .field("prefix_source", &self.prefix_source)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
