//! GTFSRev Core - Entity metadata for revisioned dataset replacement
//!
//! This crate provides the pure-data layer of the replacement engine:
//! - Entity kinds and their declared foreign-key dependencies
//! - The entity catalog, which turns declared edges into delete/write orders
//! - Revision identifiers, opaque entity records, and the revision marker
//! - The dataset container handed to the revision replacer
//!
//! Nothing in this crate touches a backing store; persistence lives in
//! `gtfsrev-db`.

mod catalog;
mod dataset;
mod error;
mod kind;
mod record;

pub use catalog::EntityCatalog;
pub use dataset::DatasetContainer;
pub use error::{Error, Result};
pub use kind::EntityKind;
pub use record::{EntityRecord, RevisionId, RevisionMarker};
