//! Database models for persistent storage.

use crate::error::{Error, Result};
use gtfsrev_core::{EntityKind, EntityRecord, RevisionId, RevisionMarker};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored entity record.
///
/// The primary key is `"<kind>/<rev>/<id>"`; the `scope` secondary key is
/// `"<kind>/<rev>"`, which makes bulk delete-by-revision-per-kind a single
/// secondary-index scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredRecord {
    /// Primary key - "<kind>/<rev>/<id>".
    #[primary_key]
    pub key: String,
    /// Secondary key - "<kind>/<rev>".
    #[secondary_key]
    pub scope: String,
    /// Entity kind name.
    pub kind: String,
    /// Owning revision.
    pub revision: u64,
    /// Identifier unique within (kind, revision).
    pub record_id: String,
    /// Opaque serialized row data.
    pub payload: Vec<u8>,
}

impl StoredRecord {
    /// Secondary key shared by all rows of one kind in one revision.
    ///
    /// The trailing `/` keeps prefix scans from matching other revisions
    /// that share leading digits ("trip/7/" vs "trip/70/").
    pub fn scope_key(kind: EntityKind, revision: RevisionId) -> String {
        format!("{}/{}/", kind.as_str(), revision.raw())
    }

    /// Create from an EntityRecord.
    pub fn from_record(record: &EntityRecord) -> Self {
        let scope = Self::scope_key(record.kind, record.revision);
        Self {
            key: format!("{}{}", scope, record.record_id),
            scope,
            kind: record.kind.as_str().to_string(),
            revision: record.revision.raw(),
            record_id: record.record_id.clone(),
            payload: record.payload.clone(),
        }
    }

    /// Convert back to an EntityRecord.
    pub fn to_record(&self) -> Result<EntityRecord> {
        let kind = EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == self.kind)
            .ok_or_else(|| Error::Database(format!("unknown entity kind: {}", self.kind)))?;
        Ok(EntityRecord::new(
            kind,
            RevisionId::new(self.revision),
            self.record_id.clone(),
            self.payload.clone(),
        ))
    }
}

/// Stored revision marker - one row per committed revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredMarker {
    /// Primary key - the revision this marker completes.
    #[primary_key]
    pub revision: u64,
    /// Number of entity records written for the revision.
    pub record_count: u64,
    /// Wall-clock write time, milliseconds since the Unix epoch.
    pub written_at_ms: i64,
}

impl StoredMarker {
    /// Create from a RevisionMarker.
    pub fn from_marker(marker: &RevisionMarker) -> Self {
        Self {
            revision: marker.revision.raw(),
            record_count: marker.record_count,
            written_at_ms: marker.written_at_ms,
        }
    }

    /// Convert back to a RevisionMarker.
    pub fn to_marker(&self) -> RevisionMarker {
        RevisionMarker {
            revision: RevisionId::new(self.revision),
            record_count: self.record_count,
            written_at_ms: self.written_at_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let record = EntityRecord::new(
            EntityKind::Trip,
            RevisionId::new(7),
            "t1",
            vec![1, 2, 3],
        );
        let stored = StoredRecord::from_record(&record);
        assert_eq!(stored.key, "trip/7/t1");
        assert_eq!(stored.scope, "trip/7/");
        assert_eq!(stored.to_record().unwrap(), record);
    }

    #[test]
    fn test_scope_key_is_not_a_prefix_of_other_revisions() {
        let seven = StoredRecord::scope_key(EntityKind::Trip, RevisionId::new(7));
        let seventy = StoredRecord::scope_key(EntityKind::Trip, RevisionId::new(70));
        assert!(!seventy.starts_with(&seven));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let stored = StoredRecord {
            key: "ghost/1/x".into(),
            scope: "ghost/1/".into(),
            kind: "ghost".into(),
            revision: 1,
            record_id: "x".into(),
            payload: vec![],
        };
        assert!(stored.to_record().is_err());
    }
}
