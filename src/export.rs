//! CSV rendering of query results.

use serde_json::Value;

use crate::client::{ColumnMeta, ResultRow};

/// Escape a field for CSV output (handles commas, quotes, newlines)
pub fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Text shown for a single cell. Strings are printed bare, `null` as an
/// empty cell, everything else as JSON.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Column names in display order: from metadata when present, otherwise the
/// keys of the first row.
pub fn column_names(meta: &[ColumnMeta], rows: &[ResultRow]) -> Vec<String> {
    if !meta.is_empty() {
        return meta.iter().map(|c| c.name.clone()).collect();
    }
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Render rows as CSV with a header line.
pub fn render_csv(meta: &[ColumnMeta], rows: &[ResultRow]) -> String {
    let columns = column_names(meta, rows);
    let mut out = String::new();

    let header: Vec<String> = columns.iter().map(|c| csv_escape(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|c| csv_escape(&cell_text(row.get(c))))
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn row(value: Value) -> ResultRow {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_csv_escape_simple() {
        assert_eq!(csv_escape("hello"), "hello");
    }

    #[test]
    fn test_csv_escape_quotes_and_commas() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("x"))), "x");
        assert_eq!(cell_text(Some(&json!(3))), "3");
        assert_eq!(cell_text(Some(&json!([1, 2]))), "[1,2]");
    }

    #[test]
    fn test_render_csv_uses_meta_order() {
        let meta = vec![
            ColumnMeta {
                name: "name".to_string(),
                data_type: "TEXT".to_string(),
                nullable: true,
                qualified_name: "users.name".to_string(),
            },
            ColumnMeta {
                name: "id".to_string(),
                data_type: "INTEGER".to_string(),
                nullable: false,
                qualified_name: "users.id".to_string(),
            },
        ];
        let rows = vec![
            row(json!({"id": 1, "name": "Ann"})),
            row(json!({"id": 2, "name": null})),
        ];
        assert_eq!(render_csv(&meta, &rows), "name,id\nAnn,1\n,2\n");
    }

    #[test]
    fn test_render_csv_without_meta() {
        let rows = vec![row(json!({"a": "x,y"}))];
        assert_eq!(render_csv(&[], &rows), "a\n\"x,y\"\n");
    }

    #[test]
    fn test_render_csv_empty() {
        assert_eq!(render_csv(&[], &[]), "\n");
    }
}
