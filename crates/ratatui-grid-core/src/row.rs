use crate::error::GridError;
use crate::error::Result;
use crate::header::HeaderRegistry;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use std::fmt;

/// Name of the built-in key field every row carries.
pub const INDEX_KEY: &str = "index";

/// A caller-owned record.
///
/// `index` is assigned by the caller and must stay stable across filter/sort/replacement: it is
/// the virtualization key and, unless another `data_key` is configured, the selection key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub index: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Row {
    pub fn new(index: u64) -> Self {
        Self {
            index,
            fields: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn has_key(&self, key: &str) -> bool {
        key == INDEX_KEY || self.fields.contains_key(key)
    }

    /// String form of a field, as used by filtering, sorting and the default cell renderer.
    pub fn display(&self, key: &str) -> String {
        if key == INDEX_KEY && !self.fields.contains_key(INDEX_KEY) {
            return self.index.to_string();
        }
        self.get(key).map(display_value).unwrap_or_default()
    }

    /// Selection key of this row under `data_key`.
    pub fn key(&self, data_key: &str) -> RowKey {
        RowKey(self.display(data_key))
    }
}

/// Renders a JSON value the way a cell shows it: strings without quotes, `null` as empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Stable identity of a row for selection purposes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(pub String);

impl RowKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for RowKey {
    fn from(i: u64) -> Self {
        Self(i.to_string())
    }
}

/// Checks that every row carries the fields the headers read, plus the selection key.
///
/// The first offending row is reported with all of its missing keys.
pub fn validate_rows(headers: &HeaderRegistry, rows: &[Row], data_key: &str) -> Result<()> {
    let mut required: Vec<&str> = headers.data_keys().collect();
    if !required.contains(&data_key) {
        required.push(data_key);
    }

    for row in rows {
        let missing: Vec<String> = required
            .iter()
            .filter(|k| !row.has_key(k))
            .map(|k| (*k).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GridError::MissingKeys {
                index: row.index,
                keys: missing,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Header;
    use serde_json::json;

    #[test]
    fn display_strips_quotes_and_nulls() {
        let row = Row::new(3)
            .with("name", "Amy")
            .with("age", 25)
            .with("note", Value::Null);
        assert_eq!(row.display("name"), "Amy");
        assert_eq!(row.display("age"), "25");
        assert_eq!(row.display("note"), "");
        assert_eq!(row.display("index"), "3");
    }

    #[test]
    fn rows_deserialize_from_flat_records() {
        let row: Row = serde_json::from_value(json!({"index": 1, "name": "Bob"})).unwrap();
        assert_eq!(row.index, 1);
        assert_eq!(row.display("name"), "Bob");
    }

    #[test]
    fn validation_names_missing_keys() {
        let headers = HeaderRegistry::new(vec![
            Header::column("name", "Name", 10),
            Header::column("age", "Age", 5),
        ])
        .unwrap();
        let rows = vec![Row::new(0).with("name", "Bob").with("age", 30), Row::new(1)];
        let err = validate_rows(&headers, &rows, INDEX_KEY).unwrap_err();
        assert_eq!(
            err,
            GridError::MissingKeys {
                index: 1,
                keys: vec!["name".into(), "age".into()],
            }
        );
    }

    #[test]
    fn validation_checks_custom_data_key() {
        let headers = HeaderRegistry::new(vec![Header::column("name", "Name", 10)]).unwrap();
        let rows = vec![Row::new(0).with("name", "Bob")];
        assert!(validate_rows(&headers, &rows, "id").is_err());
        assert!(validate_rows(&headers, &rows, INDEX_KEY).is_ok());
    }
}
