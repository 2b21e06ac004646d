//! Revision replacer: atomic wholesale replacement of one revision
//!
//! One [`RevisionReplacer::replace`] call runs the full operation inside a
//! single session (unit of work):
//!
//! 1. delete the replaced revision's rows, kind by kind in catalog delete
//!    order (referencing kinds first, so foreign keys never dangle)
//! 2. write every record of the new revision in catalog write order,
//!    through the batched writer
//! 3. write the revision marker last
//! 4. commit
//!
//! Any failure in steps 1-4 drops the session un-committed, which rolls the
//! store back to exactly its pre-call state; the error names the failing
//! phase. There is no partial success.

use crate::error::{Phase, Result};
use crate::session::StoreSession;
use crate::writer::{BatchedWriter, WriterStats, DEFAULT_BATCH_SIZE};
use chrono::Utc;
use gtfsrev_core::{DatasetContainer, EntityCatalog, RevisionId, RevisionMarker};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a successful replace operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceReport {
    /// The revision that is now active.
    pub revision: RevisionId,
    /// Stale rows removed during the delete phase.
    pub rows_deleted: u64,
    /// Records written for the new revision (marker excluded).
    pub records_written: u64,
    /// Batched-writer flushes issued.
    pub flushes: u64,
    /// End-to-end elapsed time.
    pub elapsed: Duration,
}

/// Orchestrates the replace-revision operation.
#[derive(Debug, Clone)]
pub struct RevisionReplacer {
    catalog: EntityCatalog,
    batch_size: usize,
}

impl RevisionReplacer {
    /// Create a replacer with the default batch size.
    pub fn new(catalog: EntityCatalog) -> Self {
        Self::with_batch_size(catalog, DEFAULT_BATCH_SIZE)
    }

    /// Create a replacer with an explicit batch size.
    pub fn with_batch_size(catalog: EntityCatalog, batch_size: usize) -> Self {
        Self {
            catalog,
            batch_size,
        }
    }

    /// The catalog whose delete/write orders this replacer follows.
    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Atomically replace the container's revision in the store.
    ///
    /// Takes ownership of the session: on success it is committed, on any
    /// error (or unwind) it is dropped un-committed and the store rolls
    /// back. Concurrent calls for the same revision must be serialized by
    /// the caller.
    pub fn replace<S: StoreSession>(
        &self,
        mut session: S,
        container: &DatasetContainer,
    ) -> Result<ReplaceReport> {
        let revision = container.revision();
        let started = Instant::now();
        info!(
            %revision,
            records = container.record_count(),
            "replacing revision"
        );

        let rows_deleted = self
            .delete_replaced(&mut session, revision)
            .map_err(|e| e.in_phase(Phase::Delete, revision))?;

        let stats = self
            .write_new(&mut session, container)
            .map_err(|e| e.in_phase(Phase::Write, revision))?;

        let marker = RevisionMarker {
            revision,
            record_count: stats.staged,
            written_at_ms: Utc::now().timestamp_millis(),
        };
        session
            .write_marker(&marker)
            .map_err(|e| e.in_phase(Phase::Marker, revision))?;

        session
            .commit()
            .map_err(|e| e.in_phase(Phase::Commit, revision))?;

        let elapsed = started.elapsed();
        info!(
            %revision,
            rows_deleted,
            records_written = stats.staged,
            elapsed_ms = elapsed.as_millis() as u64,
            "revision committed"
        );

        Ok(ReplaceReport {
            revision,
            rows_deleted,
            records_written: stats.staged,
            flushes: stats.flushes,
            elapsed,
        })
    }

    fn delete_replaced<S: StoreSession>(
        &self,
        session: &mut S,
        revision: RevisionId,
    ) -> Result<u64> {
        let mut rows_deleted = 0;
        for kind in self.catalog.delete_order() {
            let removed = session.delete_revision(kind, revision)?;
            debug!(%revision, kind = kind.as_str(), removed, "deleted stale rows");
            rows_deleted += removed;
        }
        Ok(rows_deleted)
    }

    fn write_new<S: StoreSession>(
        &self,
        session: &mut S,
        container: &DatasetContainer,
    ) -> Result<WriterStats> {
        let mut writer = BatchedWriter::new(session, self.batch_size);
        for &kind in self.catalog.write_order() {
            let records = container.records(kind);
            debug!(kind = kind.as_str(), count = records.len(), "writing records");
            for record in records {
                writer.stage(record)?;
            }
        }
        writer.finish()
    }
}
