use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{source_name, ColumnLayout, ImportError, SourceTable};
use crate::observation::{RawRow, RawValue};
use crate::utils::excel_serial_to_date;

/// Parser for observation workbooks (xlsx, xls, ods)
///
/// # Expected Sheet Structure:
/// ```text
/// Row 1: Headers (NAME | DATA TIMESTAMP | RAINFALL DAY MM | ...)
/// Row 2+: One observation per row
/// ```
/// Only the first worksheet is read. Date cells may be real Excel dates,
/// date serials or text.
pub struct ExcelImporter {
    workbook_path: PathBuf,
}

impl ExcelImporter {
    pub fn new(workbook_path: impl Into<PathBuf>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.workbook_path
    }

    /// Read the first worksheet (synchronous, callers in async code should use spawn_blocking)
    pub fn read(&self) -> Result<SourceTable, ImportError> {
        let name = source_name(&self.workbook_path);
        info!("Reading workbook source: {}", name);

        let mut workbook = open_workbook_auto(&self.workbook_path).map_err(|e| ImportError::Open {
            source_name: name.clone(),
            message: e.to_string(),
        })?;

        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                return Err(ImportError::Parse {
                    source_name: name,
                    message: e.to_string(),
                })
            }
            None => {
                return Err(ImportError::Parse {
                    source_name: name,
                    message: "workbook has no worksheets".to_string(),
                })
            }
        };

        let rows = parse_range(&range, &name)?;
        info!("Read {} rows from {}", rows.len(), name);

        Ok(SourceTable { name, rows })
    }
}

/// Convert a worksheet range (first row = headers) into raw rows
pub fn parse_range(range: &Range<Data>, source_name: &str) -> Result<Vec<RawRow>, ImportError> {
    let mut rows_iter = range.rows();

    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(cell_text).collect(),
        None => {
            return Err(ImportError::NoHeader {
                source_name: source_name.to_string(),
            })
        }
    };
    let layout = ColumnLayout::locate(headers.as_slice(), source_name)?;
    debug!("{}: column layout {:?}", source_name, layout);

    let mut rows = Vec::new();
    let mut blank_rows = 0;

    for row in rows_iter {
        let cell = |index: usize| row.get(index).unwrap_or(&Data::Empty);

        let station = cell(layout.station);
        let timestamp = cell(layout.timestamp);
        let rainfall = cell(layout.rainfall);

        if is_blank(station) && is_blank(timestamp) && is_blank(rainfall) {
            blank_rows += 1;
            continue;
        }

        rows.push(RawRow {
            station_name: cell_text(station),
            timestamp: timestamp_text(timestamp),
            rainfall: rainfall_value(rainfall),
        });
    }

    if blank_rows > 0 {
        debug!("{}: skipped {} blank rows", source_name, blank_rows);
    }

    Ok(rows)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        other => other.to_string(),
    }
}

/// Timestamps become ISO date text so every source shares one parser
fn timestamp_text(cell: &Data) -> String {
    let date = match cell {
        Data::DateTime(excel_date) => excel_date.as_datetime().map(|dt| dt.date()),
        Data::Float(serial) => excel_serial_to_date(*serial),
        Data::Int(serial) => excel_serial_to_date(*serial as f64),
        Data::DateTimeIso(s) | Data::String(s) => return s.clone(),
        Data::Empty => return String::new(),
        other => {
            warn!("Unexpected timestamp cell: {:?}", other);
            return other.to_string();
        }
    };

    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => {
            debug!("Timestamp cell {:?} is not a usable date", cell);
            String::new()
        }
    }
}

fn rainfall_value(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::Float(f) => Some(RawValue::Number(*f)),
        Data::Int(i) => Some(RawValue::Number(*i as f64)),
        Data::String(s) => Some(RawValue::Text(s.clone())),
        Data::Empty => None,
        other => Some(RawValue::Text(other.to_string())),
    }
}
