//! In-memory version-history store
//!
//! Histories live in a `parking_lot::RwLock<HashMap>`; the object → history
//! lineage index is a `DashMap` so lookups never contend with writers.
//!
//! Version records are visible as soon as [`create_version`] returns, the
//! same as a row insert in a relational store; [`persist`] writes back the
//! caller's copy of the history.
//!
//! [`create_version`]: VersionHistoryStore::create_version
//! [`persist`]: VersionHistoryStore::persist

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use handlemint_core::{
    Context, Error, HistoryId, ObjectId, ObjectRef, Result, Version, VersionHistory,
    VersionHistoryStore, VersionNumber,
};

/// Version-history store backed by in-process maps
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    histories: RwLock<HashMap<HistoryId, VersionHistory>>,
    lineage: DashMap<ObjectId, HistoryId>,
    next_id: AtomicU64,
}

impl InMemoryHistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
            lineage: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of histories created so far
    pub fn history_count(&self) -> usize {
        self.histories.read().len()
    }

    /// Stored copy of a history
    pub fn get(&self, id: HistoryId) -> Option<VersionHistory> {
        self.histories.read().get(&id).cloned()
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionHistoryStore for InMemoryHistoryStore {
    fn find_history(&self, _ctx: &Context, object: &ObjectRef) -> Result<Option<VersionHistory>> {
        let id = match self.lineage.get(&object.id) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        Ok(self.histories.read().get(&id).cloned())
    }

    fn create_history(&self, _ctx: &Context) -> Result<VersionHistory> {
        let id = HistoryId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let history = VersionHistory::new(id);
        self.histories.write().insert(id, history.clone());
        debug!(target: "handlemint::history", history = %id, "History created");
        Ok(history)
    }

    fn start_history(
        &self,
        _ctx: &Context,
        object: &ObjectRef,
        summary: &str,
        created_at: DateTime<Utc>,
        number: VersionNumber,
    ) -> Result<(VersionHistory, Version)> {
        let mut histories = self.histories.write();
        if let Some(existing) = self.lineage.get(&object.id) {
            return Err(Error::InvalidOperation(format!(
                "object {} already belongs to history {}",
                object.id,
                existing.value()
            )));
        }

        let id = HistoryId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut history = VersionHistory::new(id);
        let version = Version {
            number,
            object: object.id,
            history: id,
            summary: summary.to_string(),
            created_at,
        };
        history
            .insert(version.clone())
            .map_err(|v| Error::DuplicateVersion {
                history: v.history,
                number: v.number,
            })?;
        histories.insert(id, history.clone());
        self.lineage.insert(object.id, id);

        debug!(
            target: "handlemint::history",
            history = %id,
            object = %object.id,
            version = %number,
            "History started"
        );
        Ok((history, version))
    }

    fn find_version(
        &self,
        _ctx: &Context,
        history: &VersionHistory,
        object: &ObjectRef,
    ) -> Result<Option<Version>> {
        Ok(history.version_of(object.id).cloned())
    }

    fn first_version(&self, _ctx: &Context, history: &VersionHistory) -> Result<Option<Version>> {
        Ok(history.first().cloned())
    }

    fn create_version(
        &self,
        _ctx: &Context,
        history: &mut VersionHistory,
        object: &ObjectRef,
        summary: &str,
        created_at: DateTime<Utc>,
        number: Option<VersionNumber>,
    ) -> Result<Version> {
        let mut histories = self.histories.write();
        let stored = histories
            .get_mut(&history.id())
            .ok_or(Error::HistoryNotFound(history.id()))?;

        if let Some(existing) = self.lineage.get(&object.id) {
            return Err(Error::InvalidOperation(format!(
                "object {} already belongs to history {}",
                object.id,
                existing.value()
            )));
        }

        let number = number.unwrap_or_else(|| history.next_number().max(stored.next_number()));
        if history.get(number).is_some() || stored.get(number).is_some() {
            return Err(Error::DuplicateVersion {
                history: history.id(),
                number,
            });
        }

        let version = Version {
            number,
            object: object.id,
            history: history.id(),
            summary: summary.to_string(),
            created_at,
        };
        history
            .insert(version.clone())
            .and_then(|_| stored.insert(version.clone()))
            .map_err(|v| Error::DuplicateVersion {
                history: v.history,
                number: v.number,
            })?;
        self.lineage.insert(object.id, history.id());

        debug!(
            target: "handlemint::history",
            history = %history.id(),
            object = %object.id,
            version = %number,
            "Version recorded"
        );
        Ok(version)
    }

    fn persist(&self, _ctx: &Context, history: &VersionHistory) -> Result<()> {
        let mut histories = self.histories.write();
        let stored = histories
            .get_mut(&history.id())
            .ok_or(Error::HistoryNotFound(history.id()))?;
        *stored = history.clone();
        Ok(())
    }
}
