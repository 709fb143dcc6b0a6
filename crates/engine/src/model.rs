use serde::Serialize;
use serde_json::Value;

use locsync_core::stringify;

use crate::error::SyncError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single local record: a unique row key plus ordered named fields.
///
/// Field values are opaque; the engine only ever compares their string
/// form. Uniqueness of `key` is the provider's problem; the engine
/// processes duplicates independently against the same remote baseline.
#[derive(Debug, Clone)]
pub struct Record {
    pub key: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Flatten any serializable value into a record through its JSON form.
    ///
    /// `key_field` names the property carrying the row key; it is lifted
    /// out of the field list. Field order follows the JSON object order.
    pub fn from_serialize<T: Serialize>(key_field: &str, value: &T) -> Result<Self, SyncError> {
        let json = serde_json::to_value(value).map_err(|e| SyncError::RecordEncode(e.to_string()))?;
        let Value::Object(map) = json else {
            return Err(SyncError::RecordEncode("value is not an object".into()));
        };
        let key = map
            .get(key_field)
            .map(stringify)
            .ok_or_else(|| SyncError::RecordEncode(format!("missing key field '{key_field}'")))?;

        let fields = map
            .into_iter()
            .filter(|(name, _)| name != key_field)
            .collect();

        Ok(Self { key, fields })
    }
}

// ---------------------------------------------------------------------------
// Field mapping
// ---------------------------------------------------------------------------

/// Explicit mapping from record field names to sheet column keys.
///
/// Built once per record type; any field not listed maps to itself.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    /// Every field maps to the column of the same name.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn map(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.entries.push((field.into(), column.into()));
        self
    }

    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(a, b)| (a.into(), b.into()))
                .collect(),
        }
    }

    /// Column key for a field; the field's own name when unmapped.
    pub fn column_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, column)| column.as_str())
            .unwrap_or(field)
    }
}

// ---------------------------------------------------------------------------
// Diff model
// ---------------------------------------------------------------------------

/// Classification of one row's diff. Disjoint per row key within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Row on both sides, at least one column differs.
    Updated,
    /// Row exists locally but not remotely.
    New,
    /// Row exists remotely with no local record; deletion candidate.
    Orphaned,
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Updated => write!(f, "updated"),
            Self::New => write!(f, "new"),
            Self::Orphaned => write!(f, "orphaned"),
        }
    }
}

/// One differing column. `local` is absent for orphaned rows, `remote`
/// for rows not yet in the sheet.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDiff {
    pub column_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffEntry {
    pub row_key: String,
    pub kind: DiffKind,
    pub columns: Vec<ColumnDiff>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffSummary {
    pub updated: usize,
    pub added: usize,
    pub orphaned: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffMeta {
    pub table: String,
    pub engine_version: String,
    pub run_at: String,
}

/// One pass's complete classified diff.
///
/// A plain value: compute once, let the caller review, hand back to an
/// apply operation. Entries hold new and updated rows in local iteration
/// order, then orphans in sheet order.
#[derive(Debug, Clone, Serialize)]
pub struct DiffSet {
    pub meta: DiffMeta,
    pub summary: DiffSummary,
    pub entries: Vec<DiffEntry>,
}

impl DiffSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn of_kind(&self, kind: DiffKind) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn updated(&self) -> impl Iterator<Item = &DiffEntry> {
        self.of_kind(DiffKind::Updated)
    }

    pub fn added(&self) -> impl Iterator<Item = &DiffEntry> {
        self.of_kind(DiffKind::New)
    }

    pub fn orphaned(&self) -> impl Iterator<Item = &DiffEntry> {
        self.of_kind(DiffKind::Orphaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Item {
        id: String,
        name: String,
        price: u32,
    }

    #[test]
    fn from_serialize_lifts_the_key_field() {
        let item = Item {
            id: "potion".into(),
            name: "Potion".into(),
            price: 50,
        };
        let record = Record::from_serialize("id", &item).unwrap();
        assert_eq!(record.key, "potion");
        assert_eq!(
            record.fields,
            vec![
                ("name".to_string(), json!("Potion")),
                ("price".to_string(), json!(50)),
            ]
        );
        assert_eq!(record.field("price"), Some(&json!(50)));
    }

    #[test]
    fn from_serialize_requires_an_object_with_the_key() {
        assert!(matches!(
            Record::from_serialize("id", &42),
            Err(SyncError::RecordEncode(_))
        ));
        let item = Item {
            id: "x".into(),
            name: "X".into(),
            price: 1,
        };
        assert!(matches!(
            Record::from_serialize("uuid", &item),
            Err(SyncError::RecordEncode(_))
        ));
    }

    #[test]
    fn field_map_defaults_to_identity() {
        let map = FieldMap::identity().map("name_id", "Name");
        assert_eq!(map.column_for("name_id"), "Name");
        assert_eq!(map.column_for("price"), "price");
    }

    #[test]
    fn diff_set_serializes_snake_case_kinds() {
        let set = DiffSet {
            meta: DiffMeta {
                table: "Items".into(),
                engine_version: "0.1.0".into(),
                run_at: "2026-08-26T00:00:00Z".into(),
            },
            summary: DiffSummary {
                updated: 1,
                ..Default::default()
            },
            entries: vec![DiffEntry {
                row_key: "potion".into(),
                kind: DiffKind::Updated,
                columns: vec![ColumnDiff {
                    column_key: "Name".into(),
                    local: Some(json!("Potion")),
                    remote: Some(json!("Potionn")),
                }],
            }],
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["entries"][0]["kind"], "updated");
        assert_eq!(json["summary"]["updated"], 1);
        assert_eq!(json["entries"][0]["columns"][0]["local"], "Potion");
    }
}
