use serde_json::Value;

use crate::model::Record;

/// A local data owner.
///
/// Lists its records for a diff pass and accepts field writes during
/// import. The engine never persists or loads records itself; both sides
/// of the sync stay behind traits.
pub trait RecordProvider {
    /// Records in a stable iteration order. Called once per pass.
    fn records(&self) -> Vec<Record>;

    /// Apply one imported cell to local storage.
    fn set_field(&mut self, row_key: &str, column_key: &str, value: &Value);
}

/// Provider over a plain vector of records: test double and embedding aid.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    pub records: Vec<Record>,
}

impl MemoryProvider {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordProvider for MemoryProvider {
    fn records(&self) -> Vec<Record> {
        self.records.clone()
    }

    fn set_field(&mut self, row_key: &str, column_key: &str, value: &Value) {
        for record in self.records.iter_mut().filter(|r| r.key == row_key) {
            match record.fields.iter_mut().find(|(name, _)| name == column_key) {
                Some((_, slot)) => *slot = value.clone(),
                None => record.fields.push((column_key.to_string(), value.clone())),
            }
        }
    }
}
