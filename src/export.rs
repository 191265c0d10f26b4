/// CSV export of report tables
///
/// File names match the downloads operators already use, so existing
/// spreadsheets and scripts keep working.
use csv::Writer;
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::run_length::{PeriodMax, RunIndexRow, RunSpan};
use crate::grid::WideTable;
use crate::services::ReportBundle;
use crate::utils::format_rainfall;

/// Header of the day column in wide tables
pub const DAY_COLUMN: &str = "TGL";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Encoding,

    #[error("Unknown report table: {0}")]
    UnknownTable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTable {
    Display,
    Numeric,
    StationCompleteness,
    DayCompleteness,
    UnmappedNames,
    EmptyLastDay,
    GapAnalysis,
    RunIndices,
    DashboardStations,
    DashboardDays,
}

impl ReportTable {
    pub const ALL: [ReportTable; 10] = [
        ReportTable::Display,
        ReportTable::Numeric,
        ReportTable::StationCompleteness,
        ReportTable::DayCompleteness,
        ReportTable::UnmappedNames,
        ReportTable::EmptyLastDay,
        ReportTable::GapAnalysis,
        ReportTable::RunIndices,
        ReportTable::DashboardStations,
        ReportTable::DashboardDays,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ReportTable::Display => "rain_horizontal_display.csv",
            ReportTable::Numeric => "rain_horizontal_numeric.csv",
            ReportTable::StationCompleteness => "QC_station_completeness.csv",
            ReportTable::DayCompleteness => "QC_day_completeness.csv",
            ReportTable::UnmappedNames => "QC_unmapped_names.csv",
            ReportTable::EmptyLastDay => "QC_empty_last_day.csv",
            ReportTable::GapAnalysis => "QC_gap_analysis.csv",
            ReportTable::RunIndices => "rain_run_indices.csv",
            ReportTable::DashboardStations => "dashboard_station_summary.csv",
            ReportTable::DashboardDays => "dashboard_day_summary.csv",
        }
    }

    pub fn from_file_name(name: &str) -> Result<Self, ExportError> {
        Self::ALL
            .into_iter()
            .find(|table| table.file_name() == name)
            .ok_or_else(|| ExportError::UnknownTable(name.to_string()))
    }

    /// Write this table as CSV
    pub fn write<W: io::Write>(&self, bundle: &ReportBundle, writer: W) -> Result<(), ExportError> {
        let mut csv = Writer::from_writer(writer);
        match self {
            ReportTable::Display => write_wide(&mut csv, &bundle.display, |cell| cell.clone())?,
            ReportTable::Numeric => write_wide(&mut csv, &bundle.numeric, |cell| {
                cell.map(format_rainfall).unwrap_or_default()
            })?,
            ReportTable::StationCompleteness => {
                write_records(&mut csv, &bundle.qc.station_completeness)?
            }
            ReportTable::DayCompleteness => write_records(&mut csv, &bundle.qc.day_completeness)?,
            ReportTable::UnmappedNames => write_records(&mut csv, &bundle.qc.unmapped_names)?,
            ReportTable::EmptyLastDay => write_records(&mut csv, &bundle.qc.empty_on_last_day)?,
            ReportTable::GapAnalysis => write_records(&mut csv, &bundle.qc.gaps)?,
            ReportTable::RunIndices => {
                let rows: Vec<RunIndexCsvRow> =
                    bundle.run_indices.iter().map(RunIndexCsvRow::from).collect();
                write_records(&mut csv, &rows)?
            }
            ReportTable::DashboardStations => {
                write_records(&mut csv, &bundle.dashboard.stations)?
            }
            ReportTable::DashboardDays => write_records(&mut csv, &bundle.dashboard.days)?,
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn to_csv_string(&self, bundle: &ReportBundle) -> Result<String, ExportError> {
        let mut buffer = Vec::new();
        self.write(bundle, &mut buffer)?;
        String::from_utf8(buffer).map_err(|_| ExportError::Encoding)
    }
}

fn write_wide<W: io::Write, T>(
    csv: &mut Writer<W>,
    table: &WideTable<T>,
    render: impl Fn(&T) -> String,
) -> Result<(), ExportError> {
    let header = std::iter::once(DAY_COLUMN.to_string()).chain(table.stations.iter().cloned());
    csv.write_record(header)?;

    for row in &table.rows {
        let record = std::iter::once(row.day.to_string()).chain(row.values.iter().map(&render));
        csv.write_record(record)?;
    }
    Ok(())
}

/// Serialize records with a header row even when there are none
fn write_records<W: io::Write, T: Serialize + HeaderOnly>(
    csv: &mut Writer<W>,
    rows: &[T],
) -> Result<(), ExportError> {
    if rows.is_empty() {
        csv.write_record(T::HEADERS)?;
        return Ok(());
    }
    for row in rows {
        csv.serialize(row)?;
    }
    Ok(())
}

/// Column names for tables that may be empty (serde only emits headers with a first row)
pub trait HeaderOnly {
    const HEADERS: &'static [&'static str];
}

macro_rules! header_only {
    ($($ty:path => [$($col:literal),* $(,)?]),* $(,)?) => {
        $(impl HeaderOnly for $ty {
            const HEADERS: &'static [&'static str] = &[$($col),*];
        })*
    };
}

header_only! {
    crate::analysis::StationCompleteness => ["station", "days_present", "total_days", "pct"],
    crate::analysis::DayCompleteness => ["day", "stations_present", "total_stations", "pct"],
    crate::analysis::UnmappedName => ["raw_name", "canonical_attempt", "source"],
    crate::analysis::EmptyOnLastDay => ["station", "last_present_day", "empty_days"],
    crate::analysis::GapRecord => ["station", "has_any_record", "last_present_day", "gap_days"],
    crate::analysis::StationSummary => [
        "station", "total_mm", "valid_days", "rainy_days", "heavy_days", "max_mm", "max_day",
    ],
    crate::analysis::DaySummary => [
        "day", "total_mm", "mean_mm", "valid_stations", "rainy_stations", "heavy_stations",
    ],
    RunIndexCsvRow => [
        "station",
        "cdd_length", "cdd_start", "cdd_end",
        "cwd_length", "cwd_start", "cwd_end",
        "current_dry_length", "current_dry_start", "current_dry_end",
        "current_wet_length", "current_wet_start", "current_wet_end",
        "ch_max_mm", "ch_max_day",
    ],
}

/// Flat CSV form of a run-index row
#[derive(Debug, Serialize)]
pub struct RunIndexCsvRow {
    pub station: String,
    pub cdd_length: u32,
    pub cdd_start: Option<u32>,
    pub cdd_end: Option<u32>,
    pub cwd_length: u32,
    pub cwd_start: Option<u32>,
    pub cwd_end: Option<u32>,
    pub current_dry_length: u32,
    pub current_dry_start: Option<u32>,
    pub current_dry_end: Option<u32>,
    pub current_wet_length: u32,
    pub current_wet_start: Option<u32>,
    pub current_wet_end: Option<u32>,
    pub ch_max_mm: Option<f64>,
    pub ch_max_day: Option<u32>,
}

impl From<&RunIndexRow> for RunIndexCsvRow {
    fn from(row: &RunIndexRow) -> Self {
        let span = |run: &RunSpan| (run.length, run.start_day, run.end_day);
        let (cdd_length, cdd_start, cdd_end) = span(&row.longest_dry);
        let (cwd_length, cwd_start, cwd_end) = span(&row.longest_wet);
        let (current_dry_length, current_dry_start, current_dry_end) = span(&row.current_dry);
        let (current_wet_length, current_wet_start, current_wet_end) = span(&row.current_wet);
        let PeriodMax { value, day } = row.ch_max;

        Self {
            station: row.station.clone(),
            cdd_length,
            cdd_start,
            cdd_end,
            cwd_length,
            cwd_start,
            cwd_end,
            current_dry_length,
            current_dry_start,
            current_dry_end,
            current_wet_length,
            current_wet_start,
            current_wet_end,
            ch_max_mm: value,
            ch_max_day: day,
        }
    }
}

/// Write every report table into `out_dir`, creating it if needed
pub fn write_report(bundle: &ReportBundle, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(out_dir).map_err(|source| ExportError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(ReportTable::ALL.len());
    for table in ReportTable::ALL {
        let path = out_dir.join(table.file_name());
        let file = File::create(&path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        table.write(bundle, file)?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Wrote {} report tables to {}", written.len(), out_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_round_trip() {
        for table in ReportTable::ALL {
            assert_eq!(ReportTable::from_file_name(table.file_name()).unwrap(), table);
        }
        assert!(matches!(
            ReportTable::from_file_name("nope.csv"),
            Err(ExportError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_run_index_csv_row_flattens_spans() {
        let row = RunIndexRow {
            station: "A".to_string(),
            longest_dry: RunSpan {
                length: 3,
                start_day: Some(4),
                end_day: Some(6),
            },
            longest_wet: RunSpan::default(),
            current_dry: RunSpan {
                length: 1,
                start_day: Some(6),
                end_day: Some(6),
            },
            current_wet: RunSpan::default(),
            ch_max: PeriodMax {
                value: Some(0.0),
                day: Some(1),
            },
        };
        let flat = RunIndexCsvRow::from(&row);
        assert_eq!((flat.cdd_length, flat.cdd_start, flat.cdd_end), (3, Some(4), Some(6)));
        assert_eq!(flat.cwd_start, None);
        assert_eq!(flat.current_dry_end, Some(6));
        assert_eq!(flat.ch_max_mm, Some(0.0));
    }

    #[test]
    fn test_header_only_matches_serialized_fields() {
        let mut csv = Writer::from_writer(Vec::new());
        csv.serialize(crate::analysis::GapRecord {
            station: "A".to_string(),
            has_any_record: false,
            last_present_day: None,
            gap_days: 10,
        })
        .unwrap();
        let text = String::from_utf8(csv.into_inner().unwrap()).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            <crate::analysis::GapRecord as HeaderOnly>::HEADERS.join(",")
        );
        assert_eq!(text.lines().nth(1), Some("A,false,,10"));
    }
}
