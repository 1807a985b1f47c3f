//! Version lineage types
//!
//! A [`VersionHistory`] is the ordered lineage of one logical object. Each
//! [`Version`] is one snapshot, unique by number within its history. The
//! history exists iff at least one version record has been created; an object
//! without a history is unversioned.
//!
//! Gaps in numbering are allowed. Restoring from an external identifier may
//! create version 4 before versions 1–3 exist.

use crate::identifier::VersionNumber;
use crate::types::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a version history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(u64);

impl HistoryId {
    /// Wrap a raw history id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One snapshot within a lineage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Position within the lineage
    pub number: VersionNumber,
    /// The snapshot object
    pub object: ObjectId,
    /// Owning history
    pub history: HistoryId,
    /// Free-text note recorded at creation
    pub summary: String,
    /// When the version record was created
    pub created_at: DateTime<Utc>,
}

/// The ordered lineage of one logical object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionHistory {
    id: HistoryId,
    /// Sorted ascending by number, unique by number
    versions: Vec<Version>,
}

impl VersionHistory {
    /// Empty history
    pub fn new(id: HistoryId) -> Self {
        Self {
            id,
            versions: Vec::new(),
        }
    }

    /// History id
    pub fn id(&self) -> HistoryId {
        self.id
    }

    /// Versions in ascending number order
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Number of version records
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether no version record exists yet
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Lowest-numbered version
    pub fn first(&self) -> Option<&Version> {
        self.versions.first()
    }

    /// Highest-numbered version
    pub fn latest(&self) -> Option<&Version> {
        self.versions.last()
    }

    /// Version record of `object`, if it belongs to this lineage
    pub fn version_of(&self, object: ObjectId) -> Option<&Version> {
        self.versions.iter().find(|v| v.object == object)
    }

    /// Version record with `number`
    pub fn get(&self, number: VersionNumber) -> Option<&Version> {
        self.versions
            .binary_search_by(|v| v.number.cmp(&number))
            .ok()
            .map(|i| &self.versions[i])
    }

    /// Number the next sequentially created version receives
    pub fn next_number(&self) -> VersionNumber {
        self.latest()
            .map(|v| v.number.next())
            .unwrap_or(VersionNumber::FIRST)
    }

    /// Insert a version record, keeping numeric order
    ///
    /// Returns the rejected record if its number is already taken or it
    /// belongs to another history.
    pub fn insert(&mut self, version: Version) -> Result<(), Version> {
        if version.history != self.id {
            return Err(version);
        }
        match self
            .versions
            .binary_search_by(|v| v.number.cmp(&version.number))
        {
            Ok(_) => Err(version),
            Err(pos) => {
                self.versions.insert(pos, version);
                Ok(())
            }
        }
    }
}
