//! `locsync-engine` — two-way diff/reconciliation between local records
//! and a remote tabular store.
//!
//! Pure engine crate: pull a table snapshot, classify per-row diffs
//! (updated / new / orphaned), then apply an approved diff set in either
//! direction. No UI and no HTTP; the store side is the
//! [`locsync_store::TabularStore`] trait, the local side a
//! [`RecordProvider`].

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{SyncConfig, TableConfig};
pub use engine::SyncEngine;
pub use error::SyncError;
pub use model::{ColumnDiff, DiffEntry, DiffKind, DiffSet, FieldMap, Record};
pub use provider::{MemoryProvider, RecordProvider};
