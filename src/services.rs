pub mod report_service;

pub use report_service::{ReportBundle, ReportConfig, ReportService};
