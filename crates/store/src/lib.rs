//! `locsync-store` — the tabular store contract and snapshot model.
//!
//! A store is a remote 2-D table addressed by row key (first column) and
//! column key (first row header). This crate defines the trait the sync
//! engine drives, the full-table snapshot it diffs against, and an
//! in-memory reference store.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use snapshot::TableSnapshot;
pub use store::{RangeWrite, TabularStore};
