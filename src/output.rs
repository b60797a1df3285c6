use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use serde_json::Value;

use crate::report::Table;

/// Output serialization format, chosen by explicit flag or file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    /// Infer the format from an output path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Some(Self::Csv),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Serialize `table` to `path`, overwriting any existing file.
///
/// CSV gets a header row and minimal quoting; JSON is a pretty-printed array
/// of objects keyed by column name (`[]` for an empty table).
///
/// # Errors
///
/// Returns an error if the destination cannot be created or written.
pub fn write_table(path: &Path, format: Format, table: &Table) -> anyhow::Result<()> {
    let rendered = match format {
        Format::Csv => render_csv(table),
        Format::Json => render_json(table)?,
    };
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("cannot write output file: {}", path.display()))?;
    file.write_all(rendered.as_bytes())
        .with_context(|| format!("cannot write output file: {}", path.display()))?;
    Ok(())
}

fn render_csv(table: &Table) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, table.columns.iter().map(String::as_str));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(csv_cell).collect();
        push_csv_line(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn push_csv_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let quoted: Vec<String> = cells.map(csv_quote).collect();
    out.push_str(&quoted.join(","));
    out.push('\n');
}

/// Render one JSON cell as flat CSV text: strings bare, numbers bare,
/// arrays joined with a single space, null/absent empty.
fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(csv_cell).collect();
            parts.join(" ")
        }
        other => other.to_string(),
    }
}

/// Minimal CSV quoting: only cells containing the delimiter, a quote, or a
/// line break are quoted, with embedded quotes doubled.
fn csv_quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn render_json(table: &Table) -> anyhow::Result<String> {
    let objects: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let map: serde_json::Map<String, Value> = table
                .columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            Value::Object(map)
        })
        .collect();
    let mut rendered =
        serde_json::to_string_pretty(&objects).context("JSON serialization failed")?;
    rendered.push('\n');
    Ok(rendered)
}
