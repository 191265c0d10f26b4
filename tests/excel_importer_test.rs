// Workbook import tests: error paths and a worksheet feeding the report pipeline

mod common;

use calamine::{Data, Range};
use common::{test_service, CIAWI};
use rain_bulletin_service::importers::excel_importer::parse_range;
use rain_bulletin_service::importers::{read_source, ExcelImporter, ImportError, SourceTable};
use rain_bulletin_service::ingest::ingest_tables;
use rain_bulletin_service::services::ReportConfig;
use rain_bulletin_service::window::WindowSelector;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_workbook_not_found() {
    let importer = ExcelImporter::new("/nonexistent/path/to/march.xlsx");

    match importer.read() {
        Err(ImportError::Open { source_name, .. }) => assert_eq!(source_name, "march.xlsx"),
        other => panic!("Expected Open error, got {other:?}"),
    }
}

#[test]
fn test_corrupt_workbook_is_open_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xlsx");
    fs::write(&path, b"this is not a zip archive").unwrap();

    assert!(matches!(read_source(&path), Err(ImportError::Open { .. })));
}

#[test]
fn test_worksheet_rows_reach_the_report() {
    // 2025-03-01 and 2025-03-02 as Excel serials
    let mut range = Range::new((0, 0), (2, 2));
    range.set_value((0, 0), Data::String("NAME".to_string()));
    range.set_value((0, 1), Data::String("DATA TIMESTAMP".to_string()));
    range.set_value((0, 2), Data::String("RAINFALL DAY MM".to_string()));
    range.set_value((1, 0), Data::String("PH Ciawi".to_string()));
    range.set_value((1, 1), Data::Float(45717.0));
    range.set_value((1, 2), Data::Float(7.5));
    range.set_value((2, 0), Data::String("Pos Hujan Ciawi".to_string()));
    range.set_value((2, 1), Data::Float(45718.0));
    range.set_value((2, 2), Data::Float(9999.0));

    let rows = parse_range(&range, "march.xlsx").unwrap();
    let outcome = ingest_tables(vec![SourceTable {
        name: "march.xlsx".to_string(),
        rows,
    }])
    .unwrap();
    assert_eq!(outcome.observations.len(), 2);

    let report = test_service()
        .build_report(
            &outcome.observations,
            &ReportConfig::new(2025, 3, WindowSelector::TenDayFirst),
        )
        .unwrap();

    let ciawi = report.stations.iter().position(|s| s == CIAWI).unwrap();
    assert_eq!(report.display.rows[0].values[ciawi], "7.5");
    assert_eq!(report.display.rows[1].values[ciawi], "x");
    assert_eq!(report.numeric.rows[1].values[ciawi], None);
}
