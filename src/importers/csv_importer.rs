use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{source_name, ColumnLayout, ImportError, SourceTable};
use crate::observation::{RawRow, RawValue};

/// Parser for vertical observation CSV exports
///
/// # Expected layout:
/// ```text
/// NAME,DATA TIMESTAMP,RAINFALL DAY MM,...
/// Pos Hujan Ciawi,2025-01-01,12.4,...
/// ```
/// Extra columns are ignored. Semicolon-delimited files (as written by
/// spreadsheet tools in comma-decimal locales) are detected from the header,
/// and their rainfall values may use a decimal comma (`12,4`).
pub struct CsvImporter {
    path: PathBuf,
}

impl CsvImporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<SourceTable, ImportError> {
        let name = source_name(&self.path);
        info!("Reading CSV source: {}", name);

        let content = fs::read_to_string(&self.path).map_err(|e| ImportError::Open {
            source_name: name.clone(),
            message: e.to_string(),
        })?;

        let rows = parse_csv(&content, &name)?;
        info!("Read {} rows from {}", rows.len(), name);

        Ok(SourceTable { name, rows })
    }
}

/// Pick `;` when the header line has semicolons but no commas
fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

/// Parse CSV text into raw rows
pub fn parse_csv(content: &str, source_name: &str) -> Result<Vec<RawRow>, ImportError> {
    let delimiter = detect_delimiter(content);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::NoHeader {
            source_name: source_name.to_string(),
        });
    }

    let headers: Vec<&str> = headers.iter().collect();
    let layout = ColumnLayout::locate(headers.as_slice(), source_name)?;
    debug!("{}: column layout {:?}", source_name, layout);

    let mut rows = Vec::new();
    let mut blank_rows = 0;

    for result in reader.records() {
        let record = result.map_err(|e| ImportError::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;

        match raw_row(&record, &layout, delimiter == b';') {
            Some(row) => rows.push(row),
            None => blank_rows += 1,
        }
    }

    if blank_rows > 0 {
        debug!("{}: skipped {} blank rows", source_name, blank_rows);
    }

    Ok(rows)
}

/// Extract the required fields; `None` for an entirely blank row
fn raw_row(record: &StringRecord, layout: &ColumnLayout, comma_decimal: bool) -> Option<RawRow> {
    let field = |index: usize| record.get(index).unwrap_or_default();

    let station_name = field(layout.station);
    let timestamp = field(layout.timestamp);
    let rainfall = field(layout.rainfall);

    if station_name.trim().is_empty() && timestamp.trim().is_empty() && rainfall.trim().is_empty()
    {
        return None;
    }

    Some(RawRow {
        station_name: station_name.to_string(),
        timestamp: timestamp.to_string(),
        rainfall: Some(RawValue::Text(if comma_decimal {
            decimal_point(rainfall)
        } else {
            rainfall.to_string()
        })),
    })
}

/// Rewrite a single decimal comma as a point (`12,4` -> `12.4`)
fn decimal_point(value: &str) -> String {
    if value.matches(',').count() == 1 && !value.contains('.') {
        value.replacen(',', ".", 1)
    } else {
        value.to_string()
    }
}
