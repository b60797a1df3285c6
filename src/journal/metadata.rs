use std::collections::BTreeMap;

use anyhow::{Context as _, bail};
use serde_json::Value;

/// Fields that are lists in memory regardless of how the backup encoded them.
const MULTI_VALUED_FIELDS: &[&str] = &["tags"];

/// One metadata field value — a single string, or an ordered list of strings
/// for multi-valued fields like `tags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Render for a flat (CSV) cell. Lists join with a single space, the
    /// delimited encoding Sugar itself uses for tags.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(" "),
        }
    }

    /// Convert to a JSON value. Lists stay native arrays.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// One journal entry's metadata: field name → value. Immutable once parsed.
/// Missing fields are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// The `activity` field, or the empty string when absent.
    pub fn activity(&self) -> &str {
        match self.fields.get("activity") {
            Some(FieldValue::Text(s)) => s.as_str(),
            _ => "",
        }
    }

    /// Fill in `uid` from the metadata filename stem when the backup left it
    /// out of the record body (files are named `<uid>.metadata`).
    pub fn ensure_uid(&mut self, stem: &str) {
        self.fields
            .entry("uid".to_string())
            .or_insert_with(|| FieldValue::Text(stem.to_string()));
    }

    fn insert(&mut self, key: String, raw: Value) {
        let value = normalize_value(&key, raw);
        self.fields.insert(key, value);
    }
}

/// Parse one `.metadata` file's raw contents into a [`Record`].
///
/// Two encoding variants are supported, selected by sniffing the content:
/// a JSON object (Sugar 0.84+ backups) or flat `key = value` lines. Anything
/// else is a parse error; the caller skips the record and keeps going.
///
/// # Errors
///
/// Returns an error for non-object JSON, unparsable JSON, or text that is
/// not `key = value` shaped.
pub fn parse_metadata(contents: &str) -> anyhow::Result<Record> {
    let trimmed = contents.trim_start();
    if trimmed.starts_with('{') {
        parse_json_dict(trimmed)
    } else {
        parse_key_value_lines(contents)
    }
}

fn parse_json_dict(contents: &str) -> anyhow::Result<Record> {
    let value: Value = serde_json::from_str(contents).context("invalid JSON")?;
    let Value::Object(map) = value else {
        bail!("expected a JSON object at the top level");
    };

    let mut record = Record::default();
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        record.insert(key, value);
    }
    Ok(record)
}

fn parse_key_value_lines(contents: &str) -> anyhow::Result<Record> {
    let mut record = Record::default();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("line {}: not `key = value`", lineno + 1);
        };
        record.insert(
            key.trim().to_string(),
            Value::String(value.trim().to_string()),
        );
    }
    if record.fields.is_empty() {
        bail!("no metadata fields found");
    }
    Ok(record)
}

/// Collapse both known backup encodings of a field into one in-memory shape.
/// Multi-valued fields become `List` whether the backup stored a native JSON
/// array or a single whitespace-delimited string; everything else becomes
/// `Text`, with non-string scalars rendered the way JSON writes them.
fn normalize_value(key: &str, raw: Value) -> FieldValue {
    let multi_valued = MULTI_VALUED_FIELDS.contains(&key);
    match raw {
        Value::Array(items) => FieldValue::List(items.iter().map(scalar_to_string).collect()),
        Value::String(s) if multi_valued => {
            FieldValue::List(s.split_whitespace().map(str::to_string).collect())
        }
        Value::String(s) => FieldValue::Text(s),
        other => FieldValue::Text(scalar_to_string(&other)),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
