use serde_json::Value;

/// Canonical string form of a cell value.
///
/// Diff comparison is always string-coerced, never typed: a numeric `1`
/// and a text `"1"` are the same cell content. `Null` renders as the
/// empty string, same as a blank sheet cell.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
