//! CSV serialization of Darwin Core rows

use super::row::DarwinRow;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Write rows as CSV, header first, returning the number of data rows
///
/// The header is written even when there are no rows.
pub fn write_darwin_csv<W: Write>(writer: W, rows: &[DarwinRow]) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer
        .write_record(DarwinRow::COLUMNS)
        .map_err(|e| Error::csv("Failed to write CSV header", Some(e)))?;

    for row in rows {
        csv_writer.serialize(row).map_err(|e| {
            Error::csv(
                format!("Failed to write row for occurrence {}", row.occurrence_id),
                Some(e),
            )
        })?;
    }

    csv_writer.flush()?;
    debug!("Wrote {} Darwin Core rows", rows.len());
    Ok(rows.len())
}

/// Write rows to a CSV file, creating parent directories as needed
pub fn write_darwin_csv_file(path: &Path, rows: &[DarwinRow]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io(format!("Failed to create {}", parent.display()), e))?;
    }

    let file = std::fs::File::create(path)
        .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;
    let written = write_darwin_csv(file, rows)?;

    info!("Exported {} rows to {}", written, path.display());
    Ok(written)
}
