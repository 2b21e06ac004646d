//! GTFSRev DB - Storage layer for revisioned dataset replacement
//!
//! This crate provides everything that touches the backing store:
//! - [`Store`]: `native_db`-backed database with one rw-transaction per
//!   replace operation (rollback on drop)
//! - [`StoreSession`]: the unit-of-work contract the replacer is written
//!   against, so any store with delete-by-revision / upsert / flush /
//!   commit semantics can back it
//! - [`BatchedWriter`]: bounds peak memory while staging a large dataset
//! - [`RevisionReplacer`]: the delete → write → marker → commit state
//!   machine that atomically supersedes one revision with the next

mod error;
mod models;
mod replacer;
mod session;
mod store;
mod writer;

pub use error::{Error, Phase, Result};
pub use replacer::{ReplaceReport, RevisionReplacer};
pub use session::StoreSession;
pub use store::{Session, Store};
pub use writer::{BatchedWriter, WriterStats, DEFAULT_BATCH_SIZE};
