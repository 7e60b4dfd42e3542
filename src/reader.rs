//! CSV reading: locate a table's file, check its header, and turn each line
//! into a validated [`Record`].

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::errors::IngestError;
use crate::records::Record;

/// Read every row of `R`'s CSV file from `data_dir`.
///
/// Header columns are matched to table columns by exact name, untrimmed; their
/// order does not matter and extra columns are ignored. Field values are trimmed.
pub fn read_table<R: Record>(data_dir: &Path) -> Result<Vec<R>, IngestError> {
    let table = R::TABLE;
    let path = data_dir.join(table.file_name());
    if !path.is_file() {
        return Err(IngestError::MissingFile(path));
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::Fields)
        .from_path(&path)
        .map_err(|e| malformed(&path, e, 0))?;

    let headers = reader.headers().map_err(|e| malformed(&path, e, 1))?.clone();
    for column in table.columns() {
        if !headers.iter().any(|h| h == *column) {
            return Err(IngestError::MissingColumn {
                file: path,
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|e| malformed(&path, e, 0))?
    {
        let line = record.position().map_or(0, |p| p.line());
        let row: R = record
            .deserialize(Some(&headers))
            .map_err(|e| malformed(&path, e, line))?;
        row.validate().map_err(|reason| IngestError::MalformedRow {
            file: path.clone(),
            line,
            reason,
        })?;
        rows.push(row);
    }

    debug!(table = table.name(), file = %path.display(), rows = rows.len(), "Parsed CSV");
    Ok(rows)
}

fn malformed(path: &Path, err: csv::Error, line: u64) -> IngestError {
    let line = err.position().map_or(line, |p| p.line());
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => IngestError::Io(io),
        _ => IngestError::MalformedRow {
            file: path.to_path_buf(),
            line,
            reason,
        },
    }
}
