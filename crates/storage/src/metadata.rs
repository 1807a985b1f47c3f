//! In-memory metadata store
//!
//! Each object's record keeps a committed value list and, while a unit of
//! work is open, a staged copy. Reads see the staged copy; `persist` swaps it
//! in. A rejected `persist` discards the staged copy so the committed record
//! is never partially updated.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, DashSet};
use tracing::{debug, warn};

use handlemint_core::{
    Context, Error, MetadataField, MetadataStore, MetadataValue, ObjectId, ObjectRef, Result,
};

type Entries = Vec<(MetadataField, MetadataValue)>;

#[derive(Debug, Default)]
struct Record {
    committed: Entries,
    staged: Option<Entries>,
}

impl Record {
    fn current(&self) -> &Entries {
        self.staged.as_ref().unwrap_or(&self.committed)
    }

    fn stage(&mut self) -> &mut Entries {
        let committed = &self.committed;
        self.staged.get_or_insert_with(|| committed.clone())
    }
}

/// Metadata store backed by a `DashMap` of per-object records
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    records: DashMap<ObjectId, Record>,
    read_only: DashSet<ObjectId>,
    commits: AtomicU64,
}

impl InMemoryMetadataStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the committed values of `field`, bypassing staging
    pub fn seed(&self, object: &ObjectRef, field: MetadataField, values: Vec<MetadataValue>) {
        let mut record = self.records.entry(object.id).or_default();
        record.committed.retain(|(f, _)| *f != field);
        record
            .committed
            .extend(values.into_iter().map(|v| (field, v)));
    }

    /// Committed values of `field`
    pub fn committed(&self, object: &ObjectRef, field: MetadataField) -> Vec<MetadataValue> {
        self.records
            .get(&object.id)
            .map(|r| {
                r.committed
                    .iter()
                    .filter(|(f, _)| *f == field)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reject (or allow again) every `persist` of `object`
    pub fn set_read_only(&self, object: &ObjectRef, read_only: bool) {
        if read_only {
            self.read_only.insert(object.id);
        } else {
            self.read_only.remove(&object.id);
        }
    }

    /// Drop staged changes of `object`
    pub fn rollback(&self, object: &ObjectRef) {
        if let Some(mut record) = self.records.get_mut(&object.id) {
            record.staged = None;
        }
    }

    /// Whether `object` has uncommitted changes
    pub fn has_staged(&self, object: &ObjectRef) -> bool {
        self.records
            .get(&object.id)
            .map(|r| r.staged.is_some())
            .unwrap_or(false)
    }

    /// Number of successful commits
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn get_field(
        &self,
        _ctx: &Context,
        object: &ObjectRef,
        field: MetadataField,
    ) -> Result<Vec<MetadataValue>> {
        Ok(self
            .records
            .get(&object.id)
            .map(|r| {
                r.current()
                    .iter()
                    .filter(|(f, _)| *f == field)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn clear_field(&self, _ctx: &Context, object: &ObjectRef, field: MetadataField) -> Result<()> {
        let mut record = self.records.entry(object.id).or_default();
        record.stage().retain(|(f, _)| *f != field);
        Ok(())
    }

    fn add_value(
        &self,
        _ctx: &Context,
        object: &ObjectRef,
        field: MetadataField,
        value: MetadataValue,
    ) -> Result<()> {
        let mut record = self.records.entry(object.id).or_default();
        record.stage().push((field, value));
        Ok(())
    }

    fn persist(&self, ctx: &Context, object: &ObjectRef) -> Result<()> {
        let mut record = self.records.entry(object.id).or_default();
        if self.read_only.contains(&object.id) {
            record.staged = None;
            warn!(
                target: "handlemint::metadata",
                object = %object.id,
                actor = ctx.actor_name(),
                "Metadata update rejected"
            );
            return Err(Error::unauthorized(format!(
                "{} may not modify {}",
                ctx.actor_name(),
                object
            )));
        }
        if let Some(staged) = record.staged.take() {
            record.committed = staged;
            self.commits.fetch_add(1, Ordering::Relaxed);
            debug!(target: "handlemint::metadata", object = %object.id, "Metadata committed");
        }
        Ok(())
    }
}
