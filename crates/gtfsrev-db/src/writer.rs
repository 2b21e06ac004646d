//! Batched writer: bounded-memory staging of a large dataset
//!
//! Staging N records through this writer keeps at most `batch_size`
//! unflushed records in memory at a time, independent of N. Flushing pushes
//! pending records into the session's transaction; it does not commit and
//! does not change visibility.

use crate::error::Result;
use crate::session::StoreSession;
use gtfsrev_core::EntityRecord;

/// Default number of staged records per flush.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Counters reported by [`BatchedWriter::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterStats {
    /// Total records staged.
    pub staged: u64,
    /// Number of flushes issued (≈ staged / batch_size).
    pub flushes: u64,
}

/// Buffers pending upserts and flushes them in fixed-size batches.
///
/// The writer holds references into the dataset container, not clones, so
/// its peak memory is O(batch_size). It does not retry and does not
/// recover: the first store error propagates, and the enclosing
/// transaction's rollback discards every previously staged write.
#[derive(Debug)]
pub struct BatchedWriter<'s, 'r, S: StoreSession> {
    session: &'s mut S,
    pending: Vec<&'r EntityRecord>,
    batch_size: usize,
    staged: u64,
    flushes: u64,
}

impl<'s, 'r, S: StoreSession> BatchedWriter<'s, 'r, S> {
    /// Create a writer over an open session.
    pub fn new(session: &'s mut S, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be greater than 0");
        Self {
            session,
            pending: Vec::with_capacity(batch_size),
            batch_size,
            staged: 0,
            flushes: 0,
        }
    }

    /// Record one instance to be written. Flushes automatically once
    /// `batch_size` records are pending.
    pub fn stage(&mut self, record: &'r EntityRecord) -> Result<()> {
        self.pending.push(record);
        self.staged += 1;
        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Push all pending records into the session and release them.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        for record in self.pending.drain(..) {
            self.session.upsert(record)?;
        }
        self.session.flush()?;
        self.flushes += 1;
        Ok(())
    }

    /// Number of records currently pending (always < batch_size between
    /// calls).
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flush any partial final batch and return the counters.
    pub fn finish(mut self) -> Result<WriterStats> {
        self.flush()?;
        Ok(WriterStats {
            staged: self.staged,
            flushes: self.flushes,
        })
    }
}
