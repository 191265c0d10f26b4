/// Multi-source ingestion
///
/// Sources are concatenated in the order given; that order decides which of
/// two duplicate readings fills a grid cell, so it is preserved end to end.
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::error::ReportError;
use crate::importers::{read_source, source_name, ImportError, SourceTable};
use crate::observation::Observation;

/// Observations gathered from every readable source, plus what was lost on the way
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestOutcome {
    #[serde(skip)]
    pub observations: Vec<Observation>,
    pub rows_read: usize,
    /// Rows dropped because their timestamp could not be parsed
    pub dropped_rows: usize,
    pub skipped_sources: Vec<String>,
    pub warnings: Vec<String>,
}

/// Read and concatenate source files
///
/// An unreadable file is skipped with a warning. A readable file without the
/// required columns aborts the run: it is an input the operator must fix.
#[instrument(skip(paths), fields(sources = paths.len()))]
pub fn ingest_files(paths: &[PathBuf]) -> Result<IngestOutcome, ReportError> {
    let mut tables = Vec::with_capacity(paths.len());
    let mut skipped_sources = Vec::new();
    let mut warnings = Vec::new();

    for path in paths {
        match read_source(path) {
            Ok(table) => tables.push(table),
            Err(ImportError::MissingColumns {
                source_name,
                columns,
            }) => {
                return Err(ReportError::MissingFields {
                    source_name,
                    fields: columns,
                })
            }
            Err(e) => {
                warn!("Skipping unreadable source {}: {}", path.display(), e);
                skipped_sources.push(source_name(path));
                warnings.push(format!("Skipped {}: {}", source_name(path), e));
            }
        }
    }

    let mut outcome = ingest_tables(tables)?;
    outcome.skipped_sources = skipped_sources;
    outcome.warnings.splice(0..0, warnings);
    Ok(outcome)
}

/// Parse already-read tables into observations, dropping rows without a usable timestamp
pub fn ingest_tables(tables: Vec<SourceTable>) -> Result<IngestOutcome, ReportError> {
    let mut outcome = IngestOutcome::default();

    for table in tables {
        let rows = table.rows.len();
        let before = outcome.observations.len();

        outcome.observations.extend(
            table
                .rows
                .into_iter()
                .filter_map(|row| row.into_observation(&table.name)),
        );

        let kept = outcome.observations.len() - before;
        let dropped = rows - kept;
        outcome.rows_read += rows;
        outcome.dropped_rows += dropped;

        if dropped > 0 {
            warn!(
                "{}: dropped {} of {} rows with unparseable timestamps",
                table.name, dropped, rows
            );
            outcome.warnings.push(format!(
                "{}: dropped {} of {} rows with unparseable timestamps",
                table.name, dropped, rows
            ));
        }
    }

    if outcome.rows_read > 0 && outcome.observations.is_empty() {
        return Err(ReportError::NoParsableRows {
            rows: outcome.rows_read,
        });
    }

    info!(
        "Ingested {} observations from {} rows ({} dropped)",
        outcome.observations.len(),
        outcome.rows_read,
        outcome.dropped_rows
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{RawRow, RawValue};

    fn table(name: &str, rows: &[(&str, &str, f64)]) -> SourceTable {
        SourceTable {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|(station, timestamp, mm)| RawRow {
                    station_name: station.to_string(),
                    timestamp: timestamp.to_string(),
                    rainfall: Some(RawValue::Number(*mm)),
                })
                .collect(),
        }
    }

    #[test]
    fn test_tables_concatenate_in_order() {
        let outcome = ingest_tables(vec![
            table("a.csv", &[("A", "2025-01-01", 1.0)]),
            table("b.csv", &[("A", "2025-01-01", 2.0)]),
        ])
        .unwrap();

        let sources: Vec<&str> = outcome
            .observations
            .iter()
            .map(|o| o.source.as_str())
            .collect();
        assert_eq!(sources, vec!["a.csv", "b.csv"]);
        assert_eq!(outcome.observations[0].rainfall, Some(1.0));
    }

    #[test]
    fn test_bad_timestamps_dropped_with_warning() {
        let outcome = ingest_tables(vec![table(
            "a.csv",
            &[("A", "2025-01-01", 1.0), ("A", "soon", 2.0)],
        )])
        .unwrap();
        assert_eq!(outcome.rows_read, 2);
        assert_eq!(outcome.dropped_rows, 1);
        assert_eq!(outcome.observations.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_all_timestamps_bad_is_fatal() {
        let err = ingest_tables(vec![table("a.csv", &[("A", "??", 1.0)])]).unwrap_err();
        assert!(matches!(err, ReportError::NoParsableRows { rows: 1 }));
    }

    #[test]
    fn test_no_tables_is_empty_outcome() {
        let outcome = ingest_tables(Vec::new()).unwrap();
        assert!(outcome.observations.is_empty());
        assert_eq!(outcome.rows_read, 0);
    }
}
