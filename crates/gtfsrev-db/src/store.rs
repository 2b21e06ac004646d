//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::{StoredMarker, StoredRecord, StoredRecordKey};
use crate::session::StoreSession;
use gtfsrev_core::{EntityKind, EntityRecord, RevisionId, RevisionMarker};
use native_db::transaction::RwTransaction;
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredRecord>().unwrap();
    models.define::<StoredMarker>().unwrap();
    models
});

/// Database store for revisioned entity records.
pub struct Store {
    db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Connectivity(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Connectivity(e.to_string()))?;
        Ok(Self { db })
    }

    /// Open a unit of work for a replace operation.
    ///
    /// The returned session holds one rw-transaction; dropping it without
    /// committing aborts the transaction, so every exit path rolls back.
    pub fn begin(&self) -> Result<Session<'_>> {
        Ok(Session {
            rw: self.db.rw_transaction()?,
        })
    }

    /// All records of one kind in one revision.
    pub fn records(&self, kind: EntityKind, revision: RevisionId) -> Result<Vec<EntityRecord>> {
        let scope = StoredRecord::scope_key(kind, revision);
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredRecord>(StoredRecordKey::scope)?;
        let iter = scan.start_with(scope.as_str())?;
        let rows: std::result::Result<Vec<StoredRecord>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        rows.iter()
            .filter(|row| row.scope == scope)
            .map(StoredRecord::to_record)
            .collect()
    }

    /// Number of rows of one kind in one revision.
    pub fn record_count(&self, kind: EntityKind, revision: RevisionId) -> Result<u64> {
        Ok(self.records(kind, revision)?.len() as u64)
    }

    /// The marker for a revision, if that revision ever committed.
    pub fn marker(&self, revision: RevisionId) -> Result<Option<RevisionMarker>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredMarker> = r.get().primary(revision.raw())?;
        Ok(stored.map(|s| s.to_marker()))
    }

    /// Timestamp of the newest committed revision marker, in milliseconds
    /// since the Unix epoch. This is the surface an external health monitor
    /// polls; the store does not do any polling itself.
    pub fn last_successful_write_ms(&self) -> Result<Option<i64>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredMarker>()?;
        let iter = scan.all()?;
        let markers: std::result::Result<Vec<StoredMarker>, _> = iter.collect();
        let markers = markers.map_err(|e| Error::Database(e.to_string()))?;
        Ok(markers.iter().map(|m| m.written_at_ms).max())
    }
}

/// One open rw-transaction against the store.
///
/// Writes staged through a session are invisible to readers until
/// [`commit`](StoreSession::commit); native_db aborts the transaction when
/// the session is dropped un-committed.
pub struct Session<'db> {
    rw: RwTransaction<'db>,
}

impl StoreSession for Session<'_> {
    fn delete_revision(&mut self, kind: EntityKind, revision: RevisionId) -> Result<u64> {
        let scope = StoredRecord::scope_key(kind, revision);
        // Collect first: the scan borrows the transaction.
        let stale: Vec<StoredRecord> = {
            let scan = self
                .rw
                .scan()
                .secondary::<StoredRecord>(StoredRecordKey::scope)?;
            let iter = scan.start_with(scope.as_str())?;
            let rows: std::result::Result<Vec<StoredRecord>, _> = iter.collect();
            rows.map_err(|e| Error::Database(e.to_string()))?
        };
        let mut removed = 0;
        for row in stale {
            if row.scope != scope {
                continue;
            }
            self.rw.remove(row)?;
            removed += 1;
        }
        Ok(removed)
    }

    fn upsert(&mut self, record: &EntityRecord) -> Result<()> {
        self.rw.upsert(StoredRecord::from_record(record))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Upserts land in the transaction as they are issued; there is no
        // intermediate buffer at this layer.
        Ok(())
    }

    fn write_marker(&mut self, marker: &RevisionMarker) -> Result<()> {
        self.rw.upsert(StoredMarker::from_marker(marker))?;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        self.rw.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacer::{ReplaceReport, RevisionReplacer};
    use gtfsrev_core::{DatasetContainer, EntityCatalog};

    fn record(kind: EntityKind, rev: u64, id: &str) -> EntityRecord {
        EntityRecord::new(kind, RevisionId::new(rev), id, vec![0xab])
    }

    /// 3 blocks and 5 trips referencing them, all tagged `rev`.
    fn sample_container(rev: u64) -> DatasetContainer {
        let mut container = DatasetContainer::new(RevisionId::new(rev));
        for b in 0..3 {
            container
                .push(record(EntityKind::Block, rev, &format!("b{b}")))
                .unwrap();
        }
        for t in 0..5 {
            container
                .push(record(EntityKind::Trip, rev, &format!("t{t}")))
                .unwrap();
        }
        container
    }

    fn replace(store: &Store, container: &DatasetContainer) -> Result<ReplaceReport> {
        let replacer = RevisionReplacer::with_batch_size(EntityCatalog::standard(), 4);
        replacer.replace(store.begin()?, container)
    }

    fn seed(store: &Store, records: &[EntityRecord]) {
        let mut session = store.begin().unwrap();
        for r in records {
            session.upsert(r).unwrap();
        }
        session.commit().unwrap();
    }

    #[test]
    fn test_clean_replace() {
        let store = Store::in_memory().unwrap();
        let report = replace(&store, &sample_container(7)).unwrap();
        assert_eq!(report.records_written, 8);

        let rev = RevisionId::new(7);
        assert_eq!(store.record_count(EntityKind::Block, rev).unwrap(), 3);
        assert_eq!(store.record_count(EntityKind::Trip, rev).unwrap(), 5);
        let marker = store.marker(rev).unwrap().expect("marker committed");
        assert_eq!(marker.record_count, 8);
    }

    #[test]
    fn test_replace_clears_stale_rows_of_the_revision() {
        let store = Store::in_memory().unwrap();
        seed(
            &store,
            &[
                record(EntityKind::Trip, 7, "stale_trip"),
                record(EntityKind::Block, 7, "stale_block"),
            ],
        );

        replace(&store, &sample_container(7)).unwrap();

        let rev = RevisionId::new(7);
        let trips = store.records(EntityKind::Trip, rev).unwrap();
        assert_eq!(trips.len(), 5);
        assert!(trips.iter().all(|t| t.record_id != "stale_trip"));
        assert_eq!(store.record_count(EntityKind::Block, rev).unwrap(), 3);
    }

    #[test]
    fn test_idempotent_replace() {
        let store = Store::in_memory().unwrap();
        let container = sample_container(7);
        replace(&store, &container).unwrap();
        let first = store.records(EntityKind::Trip, container.revision()).unwrap();

        replace(&store, &container).unwrap();
        let second = store.records(EntityKind::Trip, container.revision()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            store
                .record_count(EntityKind::Block, container.revision())
                .unwrap(),
            3
        );
        let marker = store.marker(container.revision()).unwrap().unwrap();
        assert_eq!(marker.record_count, 8);
    }

    #[test]
    fn test_empty_kind_still_clears_and_commits() {
        let store = Store::in_memory().unwrap();
        seed(&store, &[record(EntityKind::Trip, 7, "stale_trip")]);

        // New revision 7 has blocks but no trips at all.
        let mut container = DatasetContainer::new(RevisionId::new(7));
        container
            .push(record(EntityKind::Block, 7, "b0"))
            .unwrap();
        replace(&store, &container).unwrap();

        let rev = RevisionId::new(7);
        assert_eq!(store.record_count(EntityKind::Trip, rev).unwrap(), 0);
        assert_eq!(store.record_count(EntityKind::Block, rev).unwrap(), 1);
        assert!(store.marker(rev).unwrap().is_some());
    }

    /// Delegates to an inner session, rejecting the nth upsert.
    struct FailingSession<S: StoreSession> {
        inner: S,
        fail_on_upsert: usize,
        upserts: usize,
    }

    impl<S: StoreSession> StoreSession for FailingSession<S> {
        fn delete_revision(&mut self, kind: EntityKind, revision: RevisionId) -> Result<u64> {
            self.inner.delete_revision(kind, revision)
        }

        fn upsert(&mut self, record: &EntityRecord) -> Result<()> {
            if self.upserts == self.fail_on_upsert {
                return Err(Error::Constraint {
                    kind: record.kind,
                    message: "simulated constraint violation".into(),
                });
            }
            self.upserts += 1;
            self.inner.upsert(record)
        }

        fn flush(&mut self) -> Result<()> {
            self.inner.flush()
        }

        fn write_marker(&mut self, marker: &RevisionMarker) -> Result<()> {
            self.inner.write_marker(marker)
        }

        fn commit(self) -> Result<()> {
            self.inner.commit()
        }
    }

    #[test]
    fn test_mid_write_failure_leaves_store_unchanged() {
        let store = Store::in_memory().unwrap();
        replace(&store, &sample_container(6)).unwrap();
        let prior_trips = store
            .records(EntityKind::Trip, RevisionId::new(6))
            .unwrap();

        // Reject the 4th trip write of revision 7.
        let session = FailingSession {
            inner: store.begin().unwrap(),
            fail_on_upsert: 3,
            upserts: 0,
        };
        let replacer = RevisionReplacer::with_batch_size(EntityCatalog::standard(), 4);
        let err = replacer.replace(session, &sample_container(7)).unwrap_err();
        assert_eq!(err.phase(), Some(crate::error::Phase::Write));

        // Revision 7 left no trace; revision 6 is untouched.
        let rev7 = RevisionId::new(7);
        for kind in EntityKind::ALL {
            assert_eq!(store.record_count(kind, rev7).unwrap(), 0);
        }
        assert!(store.marker(rev7).unwrap().is_none());
        assert_eq!(
            store.records(EntityKind::Trip, RevisionId::new(6)).unwrap(),
            prior_trips
        );
        assert!(store.marker(RevisionId::new(6)).unwrap().is_some());
    }

    #[test]
    fn test_uncommitted_session_rolls_back_on_drop() {
        let store = Store::in_memory().unwrap();
        {
            let mut session = store.begin().unwrap();
            session.upsert(&record(EntityKind::Stop, 7, "s0")).unwrap();
            // Dropped without commit.
        }
        assert_eq!(
            store
                .record_count(EntityKind::Stop, RevisionId::new(7))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_last_successful_write_tracks_newest_marker() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.last_successful_write_ms().unwrap(), None);

        replace(&store, &sample_container(7)).unwrap();
        replace(&store, &sample_container(8)).unwrap();

        let newest = store
            .marker(RevisionId::new(8))
            .unwrap()
            .unwrap()
            .written_at_ms;
        let older = store
            .marker(RevisionId::new(7))
            .unwrap()
            .unwrap()
            .written_at_ms;
        let last = store.last_successful_write_ms().unwrap().unwrap();
        assert_eq!(last, newest.max(older));
    }
}
