//! Unit-of-work contract against the backing store
//!
//! The revision replacer is written against this trait rather than a
//! concrete database, so the underlying store can be swapped (and tests can
//! substitute recording or failing sessions) without touching the replacer.

use crate::error::Result;
use gtfsrev_core::{EntityKind, EntityRecord, RevisionId, RevisionMarker};

/// One open unit-of-work against a backing store.
///
/// A session is exclusively owned by a single replace operation for its
/// duration. Nothing staged through it is visible to other readers until
/// [`commit`](StoreSession::commit); dropping a session without committing
/// MUST roll back everything it did, on every exit path including panics
/// and cancellation.
pub trait StoreSession {
    /// Bulk-delete every row of `kind` tagged with `revision`, regardless
    /// of whether matching instances exist in memory. Returns the number of
    /// rows removed.
    fn delete_revision(&mut self, kind: EntityKind, revision: RevisionId) -> Result<u64>;

    /// Stage one upsert into the unit of work.
    fn upsert(&mut self, record: &EntityRecord) -> Result<()>;

    /// Force previously staged writes down to the store without committing.
    ///
    /// Purely a memory/performance boundary: it never changes visibility.
    /// Stores that stage directly into the transaction may treat this as a
    /// no-op.
    fn flush(&mut self) -> Result<()>;

    /// Write the revision marker row.
    fn write_marker(&mut self, marker: &RevisionMarker) -> Result<()>;

    /// Commit the unit of work, making everything visible atomically.
    fn commit(self) -> Result<()>
    where
        Self: Sized;
}
