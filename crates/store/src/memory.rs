//! In-memory reference store.
//!
//! Backs the engine's tests and doubles as executable documentation of
//! the [`TabularStore`] contract.

use std::collections::HashMap;

use serde_json::Value;

use locsync_core::{stringify, A1Range};

use crate::error::StoreError;
use crate::store::{RangeWrite, TabularStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table from a raw grid (row 0 headers, column 0 keys).
    pub fn with_table(mut self, name: &str, grid: Vec<Vec<Value>>) -> Self {
        self.tables.insert(name.to_string(), grid);
        self
    }

    /// Raw grid of a table, for inspection.
    pub fn grid(&self, name: &str) -> Option<&Vec<Vec<Value>>> {
        self.tables.get(name)
    }

    fn grid_mut(&mut self, table: &str) -> Result<&mut Vec<Vec<Value>>, StoreError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| StoreError::Unavailable(format!("no such table '{table}'")))
    }
}

impl TabularStore for MemoryStore {
    fn read_all(&self, table: &str) -> Result<Vec<Vec<Value>>, StoreError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::Unavailable(format!("no such table '{table}'")))
    }

    fn batch_write(&mut self, table: &str, writes: &[RangeWrite]) -> Result<(), StoreError> {
        for write in writes {
            if write.values.is_empty() {
                continue;
            }
            let range: A1Range = write
                .range
                .parse()
                .map_err(|e: locsync_core::ParseRangeError| StoreError::BadRange(e.to_string()))?;
            if range.table != table {
                return Err(StoreError::BadRange(format!(
                    "range '{}' does not address table '{table}'",
                    write.range
                )));
            }

            let grid = self.grid_mut(table)?;
            for (row_offset, row_values) in write.values.iter().enumerate() {
                let grid_row = range.start_row - 1 + row_offset;
                while grid.len() <= grid_row {
                    grid.push(Vec::new());
                }
                let row = &mut grid[grid_row];
                for (col_offset, value) in row_values.iter().enumerate() {
                    let grid_col = range.start_col - 1 + col_offset;
                    while row.len() <= grid_col {
                        row.push(Value::Null);
                    }
                    row[grid_col] = value.clone();
                }
            }
        }
        Ok(())
    }

    fn delete_rows(&mut self, table: &str, rows: &[usize]) -> Result<(), StoreError> {
        let grid = self.grid_mut(table)?;
        // Indices are taken literally in call order, exactly as a remote
        // dimension-delete would: an ascending pair here would shift.
        for &row in rows {
            if row < grid.len() {
                grid.remove(row);
            }
        }
        Ok(())
    }

    fn create_row(&mut self, table: &str, row_key: &str) -> Result<(), StoreError> {
        let grid = self.grid_mut(table)?;
        let exists = grid
            .iter()
            .skip(1)
            .any(|row| row.first().map(stringify).as_deref() == Some(row_key));
        if !exists {
            grid.push(vec![Value::String(row_key.to_string())]);
        }
        Ok(())
    }
}
