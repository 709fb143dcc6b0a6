use std::collections::HashMap;

use serde_json::Value;

use locsync_core::{stringify, A1Range};

use crate::error::StoreError;
use crate::store::TabularStore;

/// Full in-memory copy of a remote table at one point in time.
///
/// Row 0 is the column-key axis and column 0 the row-key axis; neither
/// appears as a data key. Positions are raw grid indices. The whole
/// structure is rebuilt on every [`TableSnapshot::refresh`]; a snapshot
/// is stale the moment the store is written and must be re-pulled before
/// the next pass.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    table: String,
    columns: Vec<String>,
    rows: Vec<String>,
    column_index: HashMap<String, usize>,
    row_index: HashMap<String, usize>,
    /// column key → row key → cell value
    cells: HashMap<String, HashMap<String, Value>>,
}

impl TableSnapshot {
    /// Pull the full table and rebuild every index. O(rows × columns).
    pub fn refresh<S: TabularStore + ?Sized>(store: &S, table: &str) -> Result<Self, StoreError> {
        let grid = store.read_all(table)?;
        Self::from_grid(table, &grid)
    }

    pub(crate) fn from_grid(table: &str, grid: &[Vec<Value>]) -> Result<Self, StoreError> {
        let header = grid.first().ok_or_else(|| {
            StoreError::MalformedTable(format!("table '{table}' has no header row"))
        })?;

        let mut columns = Vec::new();
        let mut column_index = HashMap::new();
        let mut cells: HashMap<String, HashMap<String, Value>> = HashMap::new();
        for (pos, key) in header.iter().enumerate().skip(1) {
            let key = stringify(key);
            columns.push(key.clone());
            column_index.insert(key.clone(), pos);
            cells.insert(key, HashMap::new());
        }

        let mut rows = Vec::new();
        let mut row_index = HashMap::new();
        for (pos, row) in grid.iter().enumerate().skip(1) {
            let row_key = stringify(row.first().unwrap_or(&Value::Null));
            // A repeated row key keeps one listing; the later position wins.
            if row_index.insert(row_key.clone(), pos).is_none() {
                rows.push(row_key.clone());
            }
            for (key, &col_pos) in &column_index {
                let value = row.get(col_pos).cloned().unwrap_or(Value::Null);
                if let Some(by_row) = cells.get_mut(key) {
                    by_row.insert(row_key.clone(), value);
                }
            }
        }

        Ok(Self {
            table: table.to_string(),
            columns,
            rows,
            column_index,
            row_index,
            cells,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column keys in sheet order, key column excluded.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row keys in sheet order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn contains_column(&self, column_key: &str) -> bool {
        self.column_index.contains_key(column_key)
    }

    pub fn contains_row(&self, row_key: &str) -> bool {
        self.row_index.contains_key(row_key)
    }

    /// 0-based grid index of a data column (1 = first column after the keys).
    pub fn column_position(&self, column_key: &str) -> Option<usize> {
        self.column_index.get(column_key).copied()
    }

    /// 0-based grid index of a data row (1 = first row after the header).
    pub fn row_position(&self, row_key: &str) -> Option<usize> {
        self.row_index.get(row_key).copied()
    }

    /// Cell value; `Some(Null)` for a blank cell of a known row/column.
    pub fn cell(&self, column_key: &str, row_key: &str) -> Option<&Value> {
        self.cells.get(column_key)?.get(row_key)
    }

    /// Single-cell A1 address of a data cell.
    pub fn cell_range(&self, column_key: &str, row_key: &str) -> Option<A1Range> {
        let col = self.column_position(column_key)?;
        let row = self.row_position(row_key)?;
        Some(A1Range::cell(&self.table, col + 1, row + 1))
    }

    /// The block immediately after the last known row, spanning column A
    /// through the last known column, sized for `new_rows` appended rows.
    pub fn append_range(&self, new_rows: usize) -> A1Range {
        let first = self.rows.len() + 2;
        let last = self.rows.len() + 1 + new_rows;
        A1Range::span(&self.table, 1, first, self.columns.len() + 1, last)
    }
}
