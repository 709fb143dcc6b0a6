use serde_json::Value;

use crate::error::StoreError;

/// One element of a batched write: an A1 range plus the values to place
/// there, row-major.
#[derive(Debug, Clone)]
pub struct RangeWrite {
    pub range: String,
    pub values: Vec<Vec<Value>>,
}

/// A remote 2-D table addressed by row key (first column) and column key
/// (first row header).
///
/// Operations block; the engine issues at most one at a time. Timeouts and
/// retries are the implementation's concern, not the engine's.
pub trait TabularStore {
    /// Full-table read. Row 0 carries the column keys, column 0 the row keys.
    fn read_all(&self, table: &str) -> Result<Vec<Vec<Value>>, StoreError>;

    /// Best-effort batched write. No partial-failure semantics are
    /// promised; callers recover by re-diffing.
    fn batch_write(&mut self, table: &str, writes: &[RangeWrite]) -> Result<(), StoreError>;

    /// Delete rows by 0-based grid index, applied in the order given.
    /// Callers deleting several rows in one call must pass the indices in
    /// descending order so earlier deletions do not shift later ones.
    fn delete_rows(&mut self, table: &str, rows: &[usize]) -> Result<(), StoreError>;

    /// Append a row holding only its key. No-op when the key already exists.
    fn create_row(&mut self, table: &str, row_key: &str) -> Result<(), StoreError>;
}
