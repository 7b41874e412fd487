// ABOUTME: Row serialization for table exports
// ABOUTME: Writes one CSV or JSON file per table with deterministic field mapping

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::Value;

use crate::source::Row;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Writes one table's rows to `path` in the requested format. A zero-row
/// table still produces a file, as the explicit empty marker for that table.
pub fn write_rows(path: &Path, rows: &[Row], format: ExportFormat) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => write_csv(&mut writer, rows)?,
        ExportFormat::Json => serde_json::to_writer_pretty(&mut writer, rows)
            .with_context(|| format!("Failed to serialize {}", path.display()))?,
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush export file {}", path.display()))?;
    Ok(())
}

/// Header is the union of keys across all rows in first-seen order, so rows
/// with missing columns still map deterministically. Null and absent values
/// serialize as an explicit empty field rather than being dropped.
fn write_csv<W: Write>(writer: &mut W, rows: &[Row]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let columns = collect_columns(rows);
    writeln!(writer, "{}", render_line(columns.iter().map(String::as_str)))?;

    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|column| field_text(row.get(column)))
            .collect();
        writeln!(writer, "{}", render_line(fields.iter().map(String::as_str)))?;
    }

    Ok(())
}

fn collect_columns(rows: &[Row]) -> Vec<String> {
    let mut columns = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        // Nested structures are embedded as JSON text, the same way the rows
        // arrived from the source.
        Some(other) => other.to_string(),
    }
}

fn render_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields.map(escape_field).collect::<Vec<_>>().join(",")
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(json: serde_json::Value) -> Row {
        match json {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_csv_header_is_union_of_keys_in_first_seen_order() {
        let rows = vec![
            row(serde_json::json!({ "id": 1, "plate": "ABC-123" })),
            row(serde_json::json!({ "id": 2, "plate": "DEF-456", "notes": "spare" })),
        ];
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("id,plate,notes"));
        assert_eq!(lines.next(), Some("1,ABC-123,"));
        assert_eq!(lines.next(), Some("2,DEF-456,spare"));
    }

    #[test]
    fn test_null_and_absent_values_serialize_as_empty_fields() {
        let rows = vec![
            row(serde_json::json!({ "id": 1, "driver": null })),
            row(serde_json::json!({ "id": 2 })),
        ];
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "id,driver\n1,\n2,\n");
    }

    #[test]
    fn test_csv_quoting() {
        let rows = vec![row(serde_json::json!({
            "name": "flatbed, long",
            "comment": "needs \"urgent\" service",
            "log": "line one\nline two",
        }))];
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("\"flatbed, long\""));
        assert!(text.contains("\"needs \"\"urgent\"\" service\""));
        assert!(text.contains("\"line one\nline two\""));
    }

    #[test]
    fn test_nested_values_embed_as_json() {
        let rows = vec![row(serde_json::json!({
            "id": 7,
            "meta": { "axles": 3 },
            "tags": ["new", "leased"],
        }))];
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("\"{\"\"axles\"\":3}\""));
        assert!(text.contains("\"[\"\"new\"\",\"\"leased\"\"]\""));
    }

    #[test]
    fn test_zero_rows_still_writes_marker_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vehicles.csv");
        write_rows(&path, &[], ExportFormat::Csv).unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"");
    }

    #[test]
    fn test_json_export_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vehicles.json");
        let rows = vec![row(serde_json::json!({ "id": 1, "plate": "ABC-123" }))];
        write_rows(&path, &rows, ExportFormat::Json).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Row> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, rows);

        let empty_path = dir.path().join("empty.json");
        write_rows(&empty_path, &[], ExportFormat::Json).unwrap();
        assert_eq!(std::fs::read_to_string(&empty_path).unwrap(), "[]");
    }
}
