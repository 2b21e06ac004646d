//! Revision identifiers, opaque entity records, and the revision marker

use crate::error::{Error, Result};
use crate::kind::EntityKind;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// Identifier for one complete generation of the dataset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RevisionId(pub u64);

impl RevisionId {
    /// Create a new revision ID
    pub fn new(rev: u64) -> Self {
        Self(rev)
    }

    /// Get the raw revision value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rev:{}", self.0)
    }
}

/// One entity instance, scoped to a revision.
///
/// The engine treats records as opaque: the schema of each kind lives with
/// the loader that produced it, serialized into `payload`. Only the kind,
/// the owning revision, and a per-kind record id are visible here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The kind this record belongs to.
    pub kind: EntityKind,
    /// The revision this record is tagged with. Records are never mutated
    /// across revisions, only replaced wholesale.
    pub revision: RevisionId,
    /// Identifier unique within (kind, revision).
    pub record_id: String,
    /// Opaque serialized row data.
    pub payload: Vec<u8>,
}

impl EntityRecord {
    /// Create a record from an already-serialized payload.
    pub fn new(
        kind: EntityKind,
        revision: RevisionId,
        record_id: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            kind,
            revision,
            record_id: record_id.into(),
            payload,
        }
    }

    /// Serialize `value` into a record payload.
    pub fn encode<T: Serialize>(
        kind: EntityKind,
        revision: RevisionId,
        record_id: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        let payload = bincode::serialize(value).map_err(|e| Error::Payload(e.to_string()))?;
        Ok(Self::new(kind, revision, record_id, payload))
    }

    /// Deserialize the payload back into its typed form.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        bincode::deserialize(&self.payload).map_err(|e| Error::Payload(e.to_string()))
    }
}

/// Singleton marker row written last when a revision is replaced.
///
/// A revision's rows count as complete only once its marker is committed;
/// the marker's timestamp is the "last successful write" surface an
/// external health monitor can poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMarker {
    /// The revision this marker completes.
    pub revision: RevisionId,
    /// Number of entity records written for the revision.
    pub record_count: u64,
    /// Wall-clock write time, milliseconds since the Unix epoch.
    pub written_at_ms: i64,
}
