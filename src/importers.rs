// Source file importers for observation uploads (CSV and Excel)
//
// Importers only turn a file into unparsed rows with the three required
// fields; timestamp and rainfall parsing happens in `observation`.

pub mod csv_importer;
pub mod excel_importer;

use std::path::Path;
use thiserror::Error;

use crate::catalog::normalize_whitespace;
use crate::observation::{RawRow, REQUIRED_COLUMNS};

pub use csv_importer::CsvImporter;
pub use excel_importer::ExcelImporter;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open {source_name}: {message}")]
    Open {
        source_name: String,
        message: String,
    },

    #[error("Failed to parse {source_name} as a table: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("{source_name} has no header row")]
    NoHeader { source_name: String },

    #[error("{source_name} is missing required column(s): {}", .columns.join(", "))]
    MissingColumns {
        source_name: String,
        columns: Vec<String>,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
}

/// Rows read from one source file, labelled with the file name
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub name: String,
    pub rows: Vec<RawRow>,
}

/// Positions of the required columns within a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnLayout {
    pub station: usize,
    pub timestamp: usize,
    pub rainfall: usize,
}

impl ColumnLayout {
    /// Match headers case-insensitively after whitespace normalization
    pub(crate) fn locate<S: AsRef<str>>(
        headers: &[S],
        source_name: &str,
    ) -> Result<Self, ImportError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| normalize_whitespace(h.as_ref().trim_start_matches('\u{feff}')).to_uppercase())
            .collect();
        let find = |wanted: &str| normalized.iter().position(|h| h == wanted);

        let positions: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|c| find(c)).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&positions)
            .filter(|(_, position)| position.is_none())
            .map(|(column, _)| column.to_string())
            .collect();

        match positions.as_slice() {
            [Some(station), Some(timestamp), Some(rainfall)] => Ok(Self {
                station: *station,
                timestamp: *timestamp,
                rainfall: *rainfall,
            }),
            _ => Err(ImportError::MissingColumns {
                source_name: source_name.to_string(),
                columns: missing,
            }),
        }
    }
}

/// Display name of a source path (its file name)
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a source file, choosing the importer from its extension
pub fn read_source(path: &Path) -> Result<SourceTable, ImportError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "txt" => CsvImporter::new(path).read(),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => ExcelImporter::new(path).read(),
        _ => Err(ImportError::UnsupportedFormat(source_name(path))),
    }
}
