//! CSV export.
//!
//! Builds the whole document in memory: one header line from the columns
//! that have an accessor, then one line per record. Cells are quoted only
//! when they contain a comma, a quote or a newline.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::columns::Column;
use crate::error::ExportError;
use crate::model::Record;
use crate::model::display_string;

/// Renders one cell value.
///
/// Missing and null values are empty, objects and arrays are JSON, other
/// scalars use their display form.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(value @ (Value::Object(_) | Value::Array(_))) => value.to_string(),
        Some(value) => display_string(value),
    }
}

/// Quotes a cell if it contains a comma, a quote or a newline.
pub fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Builds the CSV document for `records` over `columns`.
pub fn to_csv(records: &[Record], columns: &[Column]) -> String {
    let columns: Vec<&Column> = columns.iter().filter(|c| c.has_accessor()).collect();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|c| escape_cell(c.label()))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        lines.push(
            columns
                .iter()
                .map(|c| escape_cell(&cell_text(c.value(record).as_ref())))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Writes `<filename>.csv` into `dir` and returns its path.
///
/// Refuses to write an empty export.
pub fn write_csv(
    records: &[Record],
    columns: &[Column],
    dir: impl AsRef<Path>,
    filename: &str,
) -> Result<PathBuf, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let path = dir.as_ref().join(format!("{}.csv", filename));
    fs::write(&path, to_csv(records, columns)).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    log::info!("Exported {} rows to {}", records.len(), path.display());
    Ok(path)
}
