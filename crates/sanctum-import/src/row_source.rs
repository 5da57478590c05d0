//! Turns tabular input into ordered [`RawRow`]s.
//!
//! Rows whose field count does not match the header are dropped here and
//! never reach the coordinator, so they are not part of `total_processed`.

use csv::{ReaderBuilder, StringRecord};
use serde_json::Value;

use crate::error::RowSourceError;
use crate::types::RawRow;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Parsed CSV text: header row, well-formed data rows, and how many were dropped.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub skipped: usize,
}

/// Parses CSV text with a header line into rows keyed by the verbatim header names.
///
/// Blank lines are ignored. A leading UTF-8 byte-order mark is stripped.
///
/// # Errors
///
/// Returns [`RowSourceError::MissingHeader`] if the input has no header line,
/// or [`RowSourceError::Csv`] if the text is not decodable CSV.
pub fn from_csv(text: &str, options: CsvOptions) -> Result<CsvTable, RowSourceError> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(ToOwned::to_owned).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(RowSourceError::MissingHeader);
    }

    let mut table = CsvTable {
        headers,
        ..CsvTable::default()
    };

    let mut record = StringRecord::new();
    let mut index = 0_usize;
    while reader.read_record(&mut record)? {
        index += 1;
        if record.len() != table.headers.len() {
            tracing::debug!(
                record = index,
                expected = table.headers.len(),
                found = record.len(),
                "skipping CSV row with mismatched column count"
            );
            table.skipped += 1;
            continue;
        }
        table.rows.push(
            table
                .headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.to_owned()))
                .collect(),
        );
    }

    Ok(table)
}

/// Converts already-parsed JSON objects (the `csvData` array of an import
/// request) into rows.
///
/// Strings are taken as-is; numbers and booleans keep their JSON text so `0`
/// stays `"0"`; `null` and nested values become empty cells. Elements that are
/// not objects are skipped.
#[must_use]
pub fn from_json(values: Vec<Value>) -> Vec<RawRow> {
    let mut rows = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        let Value::Object(object) = value else {
            tracing::debug!(index = idx, "skipping non-object import row");
            continue;
        };
        rows.push(
            object
                .into_iter()
                .map(|(column, cell)| (column, cell_text(cell)))
                .collect(),
        );
    }
    rows
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
