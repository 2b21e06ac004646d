//! Dataset container: one revision's full set of entity collections

use crate::error::{Error, Result};
use crate::kind::EntityKind;
use crate::record::{EntityRecord, RevisionId};
use indexmap::IndexMap;

/// In-memory representation of one complete revision.
///
/// Produced by an external loader, handed to the revision replacer once,
/// and discarded after the write completes. The replacer only reads it.
///
/// Records within a kind keep their insertion (source) order, so the write
/// sequence is reproducible across runs.
#[derive(Debug, Clone, Default)]
pub struct DatasetContainer {
    revision: RevisionId,
    collections: IndexMap<EntityKind, Vec<EntityRecord>>,
}

impl DatasetContainer {
    /// Create an empty container for the given revision.
    pub fn new(revision: RevisionId) -> Self {
        Self {
            revision,
            collections: IndexMap::new(),
        }
    }

    /// The revision every record in this container is tagged with.
    pub fn revision(&self) -> RevisionId {
        self.revision
    }

    /// Add one record.
    ///
    /// Returns [`Error::RevisionMismatch`] if the record is tagged with a
    /// different revision than the container holds.
    pub fn push(&mut self, record: EntityRecord) -> Result<()> {
        if record.revision != self.revision {
            return Err(Error::RevisionMismatch {
                expected: self.revision,
                got: record.revision,
            });
        }
        self.collections.entry(record.kind).or_default().push(record);
        Ok(())
    }

    /// Records of one kind, in source order. Empty slice if the kind has no
    /// records in this revision.
    pub fn records(&self, kind: EntityKind) -> &[EntityRecord] {
        self.collections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of records across all kinds.
    pub fn record_count(&self) -> u64 {
        self.collections.values().map(|v| v.len() as u64).sum()
    }

    /// True when no kind has any records.
    pub fn is_empty(&self) -> bool {
        self.collections.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: EntityKind, rev: u64, id: &str) -> EntityRecord {
        EntityRecord::new(kind, RevisionId::new(rev), id, vec![])
    }

    #[test]
    fn test_push_and_read_back_in_source_order() {
        let mut container = DatasetContainer::new(RevisionId::new(7));
        container.push(record(EntityKind::Trip, 7, "t2")).unwrap();
        container.push(record(EntityKind::Trip, 7, "t1")).unwrap();
        container.push(record(EntityKind::Block, 7, "b1")).unwrap();

        let trips = container.records(EntityKind::Trip);
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].record_id, "t2");
        assert_eq!(trips[1].record_id, "t1");
        assert_eq!(container.record_count(), 3);
        assert!(!container.is_empty());
    }

    #[test]
    fn test_missing_kind_is_empty_slice() {
        let container = DatasetContainer::new(RevisionId::new(7));
        assert!(container.records(EntityKind::FareRule).is_empty());
        assert!(container.is_empty());
    }

    #[test]
    fn test_wrong_revision_is_rejected() {
        let mut container = DatasetContainer::new(RevisionId::new(7));
        let result = container.push(record(EntityKind::Stop, 6, "s1"));
        match result {
            Err(Error::RevisionMismatch { expected, got }) => {
                assert_eq!(expected, RevisionId::new(7));
                assert_eq!(got, RevisionId::new(6));
            }
            other => panic!("expected RevisionMismatch, got {other:?}"),
        }
        assert!(container.is_empty());
    }
}
