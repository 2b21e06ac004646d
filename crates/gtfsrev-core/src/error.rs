//! Error types for gtfsrev-core

use crate::{EntityKind, RevisionId};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A record tagged with one revision was pushed into a container
    /// holding a different revision.
    #[error("revision mismatch: container holds {expected}, record is tagged {got}")]
    RevisionMismatch {
        expected: RevisionId,
        got: RevisionId,
    },

    /// The declared dependency edges contain a cycle; the kinds listed
    /// could not be ordered.
    #[error("dependency cycle among entity kinds: {remaining:?}")]
    DependencyCycle { remaining: Vec<EntityKind> },

    /// Payload serialization failed.
    #[error("payload error: {0}")]
    Payload(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
