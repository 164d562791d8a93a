use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use super::domain::{value_text, DateRange};
use super::table::CandidateTable;

/// Byte-order mark so spreadsheet tools detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// `candidate_reviews_<start>_<end>.csv`, with `open` for an unbounded end.
pub fn export_file_name(range: &DateRange) -> String {
    let end = range
        .end()
        .map(|end| end.to_string())
        .unwrap_or_else(|| "open".to_string());
    format!("candidate_reviews_{}_{}.csv", range.start(), end)
}

/// Writes the BOM, a header of every column, then one line per row.
pub fn write_csv<W: Write>(table: &CandidateTable, mut writer: W) -> Result<(), ExportError> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(render_cell))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(table: &CandidateTable) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(buffer)
}

pub fn write_csv_file<P: AsRef<Path>>(table: &CandidateTable, path: P) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(table, BufWriter::new(file))
}

fn render_cell(cell: &Option<Value>) -> String {
    cell.as_ref().and_then(value_text).unwrap_or_default()
}
