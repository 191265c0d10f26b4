// File ingestion tests: CSV sources on disk through to a finished report

mod common;

use common::{observation_csv, test_service, BOGOR, CIAWI};
use rain_bulletin_service::error::ReportError;
use rain_bulletin_service::ingest::ingest_files;
use rain_bulletin_service::services::ReportConfig;
use rain_bulletin_service::window::WindowSelector;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_earlier_file_wins_duplicates() {
    let dir = TempDir::new().unwrap();
    let first = write(
        &dir,
        "first.csv",
        &observation_csv(&[("Pos Hujan Ciawi", "2025-03-02 07:00:00", "4.2")]),
    );
    let second = write(
        &dir,
        "second.csv",
        &observation_csv(&[
            ("PH Ciawi", "2025-03-02", "9.9"),
            ("STAKLIM BOGOR", "02/03/2025", "8888"),
        ]),
    );

    let outcome = ingest_files(&[first, second]).unwrap();
    assert_eq!(outcome.rows_read, 3);
    assert_eq!(outcome.observations.len(), 3);

    let report = test_service()
        .build_report(
            &outcome.observations,
            &ReportConfig::new(2025, 3, WindowSelector::TenDayFirst),
        )
        .unwrap();

    assert_eq!(report.numeric.rows[1].values[1], Some(4.2));
    assert_eq!(report.display.rows[1].values[0], "0");
    assert_eq!(report.stations[0], BOGOR);
    assert_eq!(report.stations[1], CIAWI);
}

#[test]
fn test_unreadable_source_is_skipped() {
    let dir = TempDir::new().unwrap();
    let good = write(
        &dir,
        "good.csv",
        &observation_csv(&[("Pos Hujan Ciawi", "2025-03-01", "1.0")]),
    );
    let missing = dir.path().join("missing.csv");
    let unsupported = write(&dir, "notes.pdf", "not a table");

    let outcome = ingest_files(&[missing, good, unsupported]).unwrap();

    assert_eq!(outcome.observations.len(), 1);
    assert_eq!(outcome.skipped_sources, vec!["missing.csv", "notes.pdf"]);
    assert_eq!(outcome.warnings.len(), 2);
    assert!(outcome.warnings[0].contains("missing.csv"));
}

#[test]
fn test_missing_columns_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.csv", "NAME,DATE,RAIN\nPos Hujan Ciawi,2025-03-01,1\n");

    match ingest_files(&[path]) {
        Err(ReportError::MissingFields {
            source_name,
            fields,
        }) => {
            assert_eq!(source_name, "bad.csv");
            assert_eq!(fields, vec!["DATA TIMESTAMP", "RAINFALL DAY MM"]);
        }
        other => panic!("Expected MissingFields, got {other:?}"),
    }
}

#[test]
fn test_bad_timestamps_are_dropped_and_counted() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "march.csv",
        &observation_csv(&[
            ("Pos Hujan Ciawi", "2025-03-01", "1.0"),
            ("Pos Hujan Ciawi", "yesterday", "2.0"),
            ("Pos Hujan Ciawi", "", "3.0"),
        ]),
    );

    let outcome = ingest_files(&[path]).unwrap();
    assert_eq!(outcome.rows_read, 3);
    assert_eq!(outcome.dropped_rows, 2);
    assert_eq!(outcome.observations.len(), 1);
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn test_no_parsable_rows_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "march.csv",
        &observation_csv(&[("Pos Hujan Ciawi", "n/a", "1.0")]),
    );

    assert!(matches!(
        ingest_files(&[path]),
        Err(ReportError::NoParsableRows { rows: 1 })
    ));
}

#[test]
fn test_only_unreadable_sources_leave_nothing_to_report() {
    let dir = TempDir::new().unwrap();
    let outcome = ingest_files(&[dir.path().join("gone.csv")]).unwrap();
    assert!(outcome.observations.is_empty());

    let result = test_service().build_report(
        &outcome.observations,
        &ReportConfig::new(2025, 3, WindowSelector::FullMonth),
    );
    assert!(matches!(result, Err(ReportError::NoObservations)));
}
