/// Errors that abort a report run
///
/// Every variant except `ColumnOrder` describes an input or configuration
/// problem the operator can fix; the message names what was wrong.
/// `ColumnOrder` is a builder defect and maps to an internal error.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Source '{source_name}' is missing required column(s): {}", .fields.join(", "))]
    MissingFields {
        source_name: String,
        fields: Vec<String>,
    },

    #[error("None of the {rows} input rows has a parseable DATA TIMESTAMP")]
    NoParsableRows { rows: usize },

    #[error("No observations to report: every source was empty or unreadable")]
    NoObservations,

    #[error("No observations fall within the selected month {year}-{month:02}")]
    NoRowsForMonth { year: i32, month: u32 },

    #[error("No observations for {year}-{month:02} fall within days 1..={end_day} of the selected window")]
    NoRowsInWindow { year: i32, month: u32, end_day: u32 },

    #[error("Invalid month {0}: expected 1-12")]
    InvalidMonth(u32),

    #[error("Invalid {name}: {value} (must be a positive number of millimetres)")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Station column order mismatch: expected {expected:?}, found {found:?}")]
    ColumnOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl ReportError {
    /// True for defects in this service rather than problems with the input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ReportError::ColumnOrder { .. })
    }
}
