use std::collections::HashMap;

use serde::Deserialize;

use crate::error::SyncError;
use crate::model::FieldMap;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Sync configuration: one remote document, one or more tables.
#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    pub name: String,
    /// Store-level document id (e.g. a spreadsheet id). Opaque to the
    /// engine; store implementations consume it.
    pub document: String,
    pub tables: HashMap<String, TableConfig>,
}

/// One synchronized table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Sheet/tab name inside the document.
    pub table: String,
    /// Header of the key column (column A), and the key field name for
    /// [`crate::Record::from_serialize`].
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Record field name → sheet column key. Identity when absent.
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

fn default_key_column() -> String {
    "Key".to_string()
}

impl TableConfig {
    pub fn field_map(&self) -> FieldMap {
        FieldMap::from_pairs(self.fields.iter().map(|(f, c)| (f.clone(), c.clone())))
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SyncConfig {
    pub fn from_toml(input: &str) -> Result<Self, SyncError> {
        let config: SyncConfig =
            toml::from_str(input).map_err(|e| SyncError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.tables.is_empty() {
            return Err(SyncError::ConfigValidation(
                "at least one table is required".into(),
            ));
        }

        for (name, table) in &self.tables {
            if table.table.is_empty() {
                return Err(SyncError::ConfigValidation(format!(
                    "table '{name}': sheet name must not be empty"
                )));
            }
            if table.key_column.is_empty() {
                return Err(SyncError::ConfigValidation(format!(
                    "table '{name}': key_column must not be empty"
                )));
            }
            for (field, column) in &table.fields {
                if field.is_empty() || column.is_empty() {
                    return Err(SyncError::ConfigValidation(format!(
                        "table '{name}': field mappings must not be empty"
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Citampi localization"
document = "1AbCdEfGh"

[tables.items]
table = "Items"
key_column = "Key"

[tables.items.fields]
name_id = "Name"

[tables.dialogue]
table = "Dialogue"
"#;

    #[test]
    fn parse_valid() {
        let config = SyncConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Citampi localization");
        assert_eq!(config.tables.len(), 2);

        let items = &config.tables["items"];
        assert_eq!(items.table, "Items");
        assert_eq!(items.field_map().column_for("name_id"), "Name");
        assert_eq!(items.field_map().column_for("price"), "price");
    }

    #[test]
    fn key_column_defaults_to_key() {
        let config = SyncConfig::from_toml(VALID).unwrap();
        assert_eq!(config.tables["dialogue"].key_column, "Key");
    }

    #[test]
    fn reject_no_tables() {
        let input = r#"
name = "Empty"
document = "1AbCdEfGh"
[tables]
"#;
        let err = SyncConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("at least one table"));
    }

    #[test]
    fn reject_blank_sheet_name() {
        let input = r#"
name = "Bad"
document = "1AbCdEfGh"
[tables.items]
table = ""
"#;
        let err = SyncConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("sheet name"));
    }

    #[test]
    fn reject_blank_field_mapping() {
        let input = r#"
name = "Bad"
document = "1AbCdEfGh"
[tables.items]
table = "Items"
[tables.items.fields]
name_id = ""
"#;
        let err = SyncConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("field mappings"));
    }
}
