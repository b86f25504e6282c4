//! Darwin Core export of identified detections
//!
//! This module flattens detections into Darwin Core occurrence rows and writes
//! them as CSV. Row building is a pure mapping that tolerates corrupted or
//! inconsistent historical data.
//!
//! # Architecture
//!
//! - [`row`] - `DarwinRow` column layout and the night-level `ExportContext`
//! - [`naming`] - Deployment, dataset, event and occurrence ids plus filename timestamps
//! - [`builder`] - Detection to row mapping with sanitization and `ExportStats`
//! - [`writer`] - CSV output via the `csv` crate
//!
//! # Sanitization Rules
//!
//! - Error detections export blank taxonomy and `name = "ERROR"`
//! - `species` and `scientificName` values that look like morphospecies codes
//!   are blanked; the morphospecies has its own column
//! - `name` is recomputed from the detection state, so a morphospecies is never
//!   prefixed with its genus

pub mod builder;
pub mod naming;
pub mod row;
pub mod writer;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use builder::{ExportStats, build_row, build_rows};
pub use naming::{
    FilenameTimestamp, dataset_id, deployment_from_night_path, event_id, normalize_night_path,
    occurrence_id, parse_filename_timestamp,
};
pub use row::{DarwinRow, ExportContext};
pub use writer::{write_darwin_csv, write_darwin_csv_file};
