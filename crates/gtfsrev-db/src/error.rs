//! Error types for gtfsrev-db
//!
//! A replace operation is binary: it either fully applies or fully reverts.
//! Every failure surfaces as one [`Error`], wrapped with the phase it
//! happened in so callers can log which part of the operation failed.

use gtfsrev_core::{EntityKind, RevisionId};
use std::fmt;
use thiserror::Error;

/// Result type for gtfsrev-db operations
pub type Result<T> = std::result::Result<T, Error>;

/// Phase of a replace operation, used for error context and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Deleting the replaced revision's rows, in catalog delete order.
    Delete,
    /// Writing the new revision's records, in catalog write order.
    Write,
    /// Writing the revision marker.
    Marker,
    /// Committing the transaction.
    Commit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Delete => "delete",
            Phase::Write => "write",
            Phase::Marker => "marker",
            Phase::Commit => "commit",
        };
        write!(f, "{name}")
    }
}

/// Errors that can occur in gtfsrev-db
#[derive(Debug, Error)]
pub enum Error {
    /// Transport/connection failure reaching the backing store. Not retried
    /// here; the caller may retry the whole replace call.
    #[error("store connectivity error: {0}")]
    Connectivity(String),

    /// A write violated a foreign-key or uniqueness constraint. Fatal for
    /// the call; the offending entity kind is identified.
    #[error("constraint violation on {kind}: {message}")]
    Constraint { kind: EntityKind, message: String },

    /// Any other backing-store failure.
    #[error("database error: {0}")]
    Database(String),

    /// A replace operation failed; the transaction was rolled back and the
    /// store is unchanged. Wraps the underlying error with the phase that
    /// failed (boxed to keep the error small during propagation).
    #[error("{phase} phase failed for {revision}: {source}")]
    Replace {
        phase: Phase,
        revision: RevisionId,
        source: Box<Error>,
    },

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] gtfsrev_core::Error),
}

impl Error {
    /// Wrap this error with the replace phase it occurred in.
    pub fn in_phase(self, phase: Phase, revision: RevisionId) -> Self {
        Error::Replace {
            phase,
            revision,
            source: Box::new(self),
        }
    }

    /// The failing phase, if this is a replace error.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::Replace { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
// This function is never called but will fail to compile if the bound is not satisfied.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
