//! CSV writer tests

use super::*;
use crate::app::services::darwin_export::{
    DarwinRow, build_rows, write_darwin_csv, write_darwin_csv_file,
};
use tempfile::TempDir;

#[test]
fn test_header_written_for_empty_export() {
    let mut buffer = Vec::new();
    let written = write_darwin_csv(&mut buffer, &[]).unwrap();
    let output = String::from_utf8(buffer).unwrap();

    assert_eq!(written, 0);
    assert_eq!(output.trim_end(), DarwinRow::COLUMNS.join(","));
}

#[test]
fn test_rows_follow_header_order() {
    let detection = apply(
        &create_diptera_detection("p1"),
        IdentificationInput::morphospecies("111"),
    );
    let (rows, _) = build_rows([&detection], &create_test_export_context());

    let mut buffer = Vec::new();
    write_darwin_csv(&mut buffer, &rows).unwrap();
    let output = String::from_utf8(buffer).unwrap();

    let mut reader = csv::Reader::from_reader(output.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), DarwinRow::COLUMNS.len());
    assert_eq!(&headers[7], "morphospecies");

    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[0], "Animalia");
    assert_eq!(&record[3], "Diptera");
    assert_eq!(&record[7], "111");
    assert_eq!(&record[12], "111");
}

#[test]
fn test_write_csv_file_creates_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("exports").join("darwin_core.csv");
    let detection = create_test_detection("p1");
    let (rows, _) = build_rows([&detection], &create_test_export_context());

    let written = write_darwin_csv_file(&path, &rows).unwrap();

    assert_eq!(written, 1);
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}
