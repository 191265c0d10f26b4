// Report analyses over the classified grids
//
// - `completeness`: data-quality tables (coverage, unmapped names, gaps)
// - `run_length`: consecutive dry/wet day indices and period maxima
// - `dashboard`: totals and threshold counts per station and per day

pub mod completeness;
pub mod dashboard;
pub mod run_length;

pub use completeness::{
    DayCompleteness, EmptyOnLastDay, GapRecord, QcReport, StationCompleteness, UnmappedName,
};
pub use dashboard::{Dashboard, DashboardThresholds, DaySummary, Highlights, StationSummary};
pub use run_length::{PeriodMax, RunCondition, RunIndexRow, RunKind, RunSpan};
