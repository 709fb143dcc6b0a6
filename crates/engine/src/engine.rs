use serde_json::Value;

use locsync_core::stringify;
use locsync_store::{RangeWrite, TableSnapshot, TabularStore};

use crate::config::TableConfig;
use crate::error::SyncError;
use crate::model::{
    ColumnDiff, DiffEntry, DiffKind, DiffMeta, DiffSet, DiffSummary, FieldMap, Record,
};
use crate::provider::RecordProvider;

/// Two-way reconciliation over one table of a [`TabularStore`].
///
/// One pass = [`compute_diffs`](Self::compute_diffs) → caller review →
/// [`apply_export`](Self::apply_export) or
/// [`apply_import`](Self::apply_import). The snapshot is re-pulled at the
/// start of every pass and consumed by the apply. Applying twice, or
/// applying without a pass, is refused rather than run against stale
/// indices.
pub struct SyncEngine<'a, S: TabularStore + ?Sized> {
    store: &'a mut S,
    table: String,
    field_map: FieldMap,
    snapshot: Option<TableSnapshot>,
}

impl<'a, S: TabularStore + ?Sized> SyncEngine<'a, S> {
    pub fn new(store: &'a mut S, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            field_map: FieldMap::identity(),
            snapshot: None,
        }
    }

    pub fn with_field_map(mut self, field_map: FieldMap) -> Self {
        self.field_map = field_map;
        self
    }

    /// Engine for one configured table, field map included.
    pub fn for_table(store: &'a mut S, config: &TableConfig) -> Self {
        Self::new(store, config.table.clone()).with_field_map(config.field_map())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Pull a fresh snapshot and classify every row on either side.
    ///
    /// Local records are walked in iteration order; each claims its remote
    /// row. Fields without a matching remote column are skipped silently.
    /// Remote rows claimed by no record come back as orphans, in sheet
    /// order. Duplicate local keys are not deduplicated: each occurrence
    /// is compared against the same remote baseline.
    pub fn compute_diffs(&mut self, records: &[Record]) -> Result<DiffSet, SyncError> {
        let snapshot = TableSnapshot::refresh(&*self.store, &self.table)?;

        let mut entries = Vec::new();
        let mut summary = DiffSummary::default();
        let mut unclaimed: Vec<String> = snapshot.rows().to_vec();

        for record in records {
            unclaimed.retain(|key| key != &record.key);
            let row_exists = snapshot.contains_row(&record.key);

            let mut columns = Vec::new();
            for (field, local) in &record.fields {
                let column = self.field_map.column_for(field);
                if !snapshot.contains_column(column) {
                    continue;
                }
                let remote = if row_exists {
                    snapshot.cell(column, &record.key)
                } else {
                    None
                };
                if let Some(remote) = remote {
                    if stringify(remote) == stringify(local) {
                        continue;
                    }
                }
                columns.push(ColumnDiff {
                    column_key: column.to_string(),
                    local: Some(local.clone()),
                    remote: remote.cloned(),
                });
            }

            if columns.is_empty() {
                continue;
            }
            let kind = if row_exists {
                summary.updated += 1;
                DiffKind::Updated
            } else {
                summary.added += 1;
                DiffKind::New
            };
            entries.push(DiffEntry {
                row_key: record.key.clone(),
                kind,
                columns,
            });
        }

        for row_key in unclaimed {
            let columns = snapshot
                .columns()
                .iter()
                .map(|column| ColumnDiff {
                    column_key: column.clone(),
                    local: None,
                    remote: snapshot.cell(column, &row_key).cloned(),
                })
                .collect();
            summary.orphaned += 1;
            entries.push(DiffEntry {
                row_key,
                kind: DiffKind::Orphaned,
                columns,
            });
        }

        self.snapshot = Some(snapshot);
        Ok(DiffSet {
            meta: DiffMeta {
                table: self.table.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            entries,
        })
    }

    /// Convenience: diff a provider's current records.
    pub fn compute_diffs_from(&mut self, provider: &dyn RecordProvider) -> Result<DiffSet, SyncError> {
        let records = provider.records();
        self.compute_diffs(&records)
    }

    /// Push accepted diffs to the store: new rows land as one consecutive
    /// append block, changed cells as individual range writes, all in a
    /// single batch. Orphaned rows are then deleted.
    ///
    /// The batch is best-effort; on partial failure nothing is rolled
    /// back and the next diff pass re-detects whatever did not land.
    pub fn apply_export(&mut self, diffs: &DiffSet) -> Result<(), SyncError> {
        let snapshot = self.snapshot.take().ok_or(SyncError::NoDiffPass)?;
        let mut writes = Vec::new();

        let added: Vec<&DiffEntry> = diffs.added().collect();
        if !added.is_empty() {
            let range = snapshot.append_range(added.len());
            let mut rows = Vec::with_capacity(added.len());
            for entry in &added {
                // Full row layout: key first, then every sheet column in
                // order, blank where the record had nothing to say.
                let mut row = vec![Value::String(entry.row_key.clone())];
                for column in snapshot.columns() {
                    let value = entry
                        .columns
                        .iter()
                        .find(|c| &c.column_key == column)
                        .and_then(|c| c.local.clone())
                        .unwrap_or(Value::Null);
                    row.push(value);
                }
                rows.push(row);
            }
            writes.push(RangeWrite {
                range: range.to_string(),
                values: rows,
            });
        }

        for entry in diffs.updated() {
            for column in &entry.columns {
                let Some(range) = snapshot.cell_range(&column.column_key, &entry.row_key) else {
                    continue;
                };
                writes.push(RangeWrite {
                    range: range.to_string(),
                    values: vec![vec![column.local.clone().unwrap_or(Value::Null)]],
                });
            }
        }

        if !writes.is_empty() {
            self.store.batch_write(&self.table, &writes)?;
        }
        self.delete_orphans(&snapshot, diffs)
    }

    /// Pull accepted diffs into local records through the provider.
    ///
    /// Only updated rows import; new rows have no remote value to pull.
    /// Orphaned rows are deleted from the store here too: they represent
    /// remote rows no local record backs, whichever direction wins.
    pub fn apply_import(
        &mut self,
        diffs: &DiffSet,
        provider: &mut dyn RecordProvider,
    ) -> Result<(), SyncError> {
        let snapshot = self.snapshot.take().ok_or(SyncError::NoDiffPass)?;

        for entry in diffs.updated() {
            for column in &entry.columns {
                let value = column.remote.clone().unwrap_or(Value::Null);
                provider.set_field(&entry.row_key, &column.column_key, &value);
            }
        }

        self.delete_orphans(&snapshot, diffs)
    }

    fn delete_orphans(&mut self, snapshot: &TableSnapshot, diffs: &DiffSet) -> Result<(), SyncError> {
        let mut rows: Vec<usize> = diffs
            .orphaned()
            .filter_map(|entry| snapshot.row_position(&entry.row_key))
            .collect();
        if rows.is_empty() {
            return Ok(());
        }
        // Highest index first so earlier deletions do not shift later ones.
        rows.sort_unstable_by(|a, b| b.cmp(a));
        self.store.delete_rows(&self.table, &rows)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;
    use locsync_store::MemoryStore;
    use serde_json::json;

    fn seeded_store() -> MemoryStore {
        MemoryStore::new().with_table(
            "Strings",
            vec![
                vec![json!("Key"), json!("en"), json!("id")],
                vec![json!("greet"), json!("Hello"), json!("Halo")],
                vec![json!("bye"), json!("Bye"), json!("Dadah")],
            ],
        )
    }

    #[test]
    fn identical_sides_produce_no_diff() {
        let mut store = seeded_store();
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let records = vec![
            Record::new("greet").with_field("en", "Hello").with_field("id", "Halo"),
            Record::new("bye").with_field("en", "Bye").with_field("id", "Dadah"),
        ];
        let diffs = engine.compute_diffs(&records).unwrap();
        assert!(diffs.is_empty());
    }

    #[test]
    fn numeric_and_text_cells_compare_as_strings() {
        let mut store = MemoryStore::new().with_table(
            "Numbers",
            vec![
                vec![json!("Key"), json!("count")],
                vec![json!("a"), json!("1")],
            ],
        );
        let mut engine = SyncEngine::new(&mut store, "Numbers");
        let records = vec![Record::new("a").with_field("count", 1)];
        let diffs = engine.compute_diffs(&records).unwrap();
        assert!(diffs.is_empty(), "integer 1 must equal text \"1\"");
    }

    #[test]
    fn unknown_fields_are_silently_ignored() {
        let mut store = seeded_store();
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let records = vec![
            Record::new("greet")
                .with_field("en", "Hello")
                .with_field("id", "Halo")
                .with_field("jp", "Konnichiwa"),
            Record::new("bye").with_field("en", "Bye").with_field("id", "Dadah"),
        ];
        let diffs = engine.compute_diffs(&records).unwrap();
        assert!(diffs.is_empty());
    }

    #[test]
    fn field_map_routes_fields_to_columns() {
        let mut store = seeded_store();
        let mut engine = SyncEngine::new(&mut store, "Strings")
            .with_field_map(FieldMap::identity().map("english", "en").map("indonesian", "id"));
        let records = vec![
            Record::new("greet")
                .with_field("english", "Hello")
                .with_field("indonesian", "Halo"),
            Record::new("bye")
                .with_field("english", "Bye")
                .with_field("indonesian", "Dadah"),
        ];
        let diffs = engine.compute_diffs(&records).unwrap();
        assert!(diffs.is_empty());
    }

    #[test]
    fn every_row_key_gets_exactly_one_classification() {
        let mut store = seeded_store();
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let records = vec![
            Record::new("greet").with_field("en", "Hello again"), // updated
            Record::new("thanks").with_field("en", "Thanks"),     // new
        ];
        // "bye" is claimed by nobody → orphaned
        let diffs = engine.compute_diffs(&records).unwrap();

        assert_eq!(diffs.summary.updated, 1);
        assert_eq!(diffs.summary.added, 1);
        assert_eq!(diffs.summary.orphaned, 1);
        let mut keys: Vec<&str> = diffs.entries.iter().map(|e| e.row_key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), diffs.entries.len(), "row keys must be disjoint");
    }

    #[test]
    fn new_and_updated_precede_orphans() {
        let mut store = seeded_store();
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let records = vec![
            Record::new("thanks").with_field("en", "Thanks"),
            Record::new("greet").with_field("en", "Hello again"),
        ];
        let diffs = engine.compute_diffs(&records).unwrap();
        let kinds: Vec<DiffKind> = diffs.entries.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, [DiffKind::New, DiffKind::Updated, DiffKind::Orphaned]);
        // Discovery order: local iteration order first, then sheet order.
        assert_eq!(diffs.entries[0].row_key, "thanks");
        assert_eq!(diffs.entries[1].row_key, "greet");
        assert_eq!(diffs.entries[2].row_key, "bye");
    }

    #[test]
    fn orphans_carry_all_remote_columns_and_no_local() {
        let mut store = seeded_store();
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let diffs = engine.compute_diffs(&[]).unwrap();

        assert_eq!(diffs.summary.orphaned, 2);
        for entry in diffs.orphaned() {
            assert_eq!(entry.columns.len(), 2);
            assert!(entry.columns.iter().all(|c| c.local.is_none()));
            assert!(entry.columns.iter().all(|c| c.remote.is_some()));
        }
    }

    #[test]
    fn new_row_against_empty_table() {
        let mut store = MemoryStore::new()
            .with_table("Strings", vec![vec![json!("Key"), json!("en"), json!("id")]]);
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let records = vec![Record::new("greet").with_field("en", "Hello")];
        let diffs = engine.compute_diffs(&records).unwrap();

        assert_eq!(diffs.summary.added, 1);
        assert_eq!(diffs.entries[0].kind, DiffKind::New);
        assert!(diffs.entries[0].columns[0].remote.is_none());
    }

    #[test]
    fn duplicate_local_keys_share_the_remote_baseline() {
        let mut store = seeded_store();
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let records = vec![
            Record::new("greet").with_field("en", "First"),
            Record::new("greet").with_field("en", "Second"),
        ];
        let diffs = engine.compute_diffs(&records).unwrap();

        // Both occurrences diff against the sheet's "Hello", not each other.
        let updated: Vec<&DiffEntry> = diffs.updated().collect();
        assert_eq!(updated.len(), 2);
        for entry in updated {
            assert_eq!(entry.columns[0].remote, Some(json!("Hello")));
        }
    }

    #[test]
    fn apply_without_a_pass_is_refused() {
        let mut store = seeded_store();
        let diffs = {
            let mut engine = SyncEngine::new(&mut store, "Strings");
            engine.compute_diffs(&[]).unwrap()
        };
        let mut other_store = seeded_store();
        let mut engine = SyncEngine::new(&mut other_store, "Strings");
        assert!(matches!(engine.apply_export(&diffs), Err(SyncError::NoDiffPass)));
    }

    #[test]
    fn export_writes_cells_appends_rows_and_deletes_orphans() {
        let mut store = seeded_store();
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let records = vec![
            Record::new("greet").with_field("en", "Hello!").with_field("id", "Halo"),
            Record::new("thanks").with_field("en", "Thanks").with_field("id", "Makasih"),
        ];
        let diffs = engine.compute_diffs(&records).unwrap();
        engine.apply_export(&diffs).unwrap();

        let grid = store.grid("Strings").unwrap();
        // "bye" deleted, "thanks" appended after the original last row.
        assert_eq!(grid[1], vec![json!("greet"), json!("Hello!"), json!("Halo")]);
        assert_eq!(
            grid[2],
            vec![json!("thanks"), json!("Thanks"), json!("Makasih")]
        );
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn import_updates_provider_and_drops_orphans() {
        let mut store = seeded_store();
        let mut provider = MemoryProvider::new(vec![
            Record::new("greet").with_field("en", "Hello there").with_field("id", "Halo"),
        ]);
        let mut engine = SyncEngine::new(&mut store, "Strings");
        let diffs = engine.compute_diffs_from(&provider).unwrap();
        engine.apply_import(&diffs, &mut provider).unwrap();

        // Sheet value wins locally; "bye" leaves the sheet.
        assert_eq!(provider.records[0].field("en"), Some(&json!("Hello")));
        let grid = store.grid("Strings").unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1][0], json!("greet"));
    }
}
