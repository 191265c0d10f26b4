use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::analysis::completeness::QcReport;
use crate::analysis::dashboard::{
    Dashboard, DashboardThresholds, DEFAULT_HEAVY_THRESHOLD_MM, DEFAULT_RAINY_THRESHOLD_MM,
};
use crate::analysis::run_length::{run_indices, RunIndexRow, DEFAULT_WET_THRESHOLD_MM};
use crate::catalog::StationCatalog;
use crate::error::ReportError;
use crate::grid::{classify_grid, GridBuilder, WideTable};
use crate::observation::Observation;
use crate::window::{ReportingWindow, WindowSelector};

fn default_wet_threshold() -> f64 {
    DEFAULT_WET_THRESHOLD_MM
}

fn default_heavy_threshold() -> f64 {
    DEFAULT_HEAVY_THRESHOLD_MM
}

fn default_rainy_threshold() -> f64 {
    DEFAULT_RAINY_THRESHOLD_MM
}

/// Parameters of one report run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub year: i32,
    pub month: u32,
    pub window: WindowSelector,
    #[serde(default = "default_wet_threshold")]
    pub wet_threshold: f64,
    #[serde(default = "default_heavy_threshold")]
    pub heavy_threshold: f64,
    #[serde(default = "default_rainy_threshold")]
    pub rainy_threshold: f64,
}

impl ReportConfig {
    pub fn new(year: i32, month: u32, window: WindowSelector) -> Self {
        Self {
            year,
            month,
            window,
            wet_threshold: DEFAULT_WET_THRESHOLD_MM,
            heavy_threshold: DEFAULT_HEAVY_THRESHOLD_MM,
            rainy_threshold: DEFAULT_RAINY_THRESHOLD_MM,
        }
    }

    /// Resolve the reporting window and check thresholds
    pub fn validate(&self) -> Result<ReportingWindow, ReportError> {
        for (name, value) in [
            ("wet_threshold", self.wet_threshold),
            ("heavy_threshold", self.heavy_threshold),
            ("rainy_threshold", self.rainy_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReportError::InvalidThreshold { name, value });
            }
        }
        ReportingWindow::new(self.year, self.month, self.window)
    }
}

/// Everything one report run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBundle {
    pub window: ReportingWindow,
    pub wet_threshold: f64,
    pub stations: Vec<String>,
    /// BMKG display grid (`x`, `-`, `0` or a number)
    pub display: WideTable<String>,
    /// Classified numeric grid (`None` for missing)
    pub numeric: WideTable<Option<f64>>,
    pub qc: QcReport,
    pub run_indices: Vec<RunIndexRow>,
    pub dashboard: Dashboard,
}

/// Runs the report pipeline against the shared station catalog
///
/// Each call works on its own snapshot of observations; the catalog is the
/// only state shared between calls and it is never mutated.
#[derive(Clone)]
pub struct ReportService {
    catalog: Arc<StationCatalog>,
}

impl ReportService {
    pub fn new(catalog: Arc<StationCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    /// Build the full report for one month window
    ///
    /// Observations must be in source-concatenation order; it decides which
    /// duplicate reading fills a cell.
    #[instrument(skip(self, observations), fields(observations = observations.len()))]
    pub fn build_report(
        &self,
        observations: &[Observation],
        config: &ReportConfig,
    ) -> Result<ReportBundle, ReportError> {
        let window = config.validate()?;
        info!("Building report for {}", window);

        if observations.is_empty() {
            return Err(ReportError::NoObservations);
        }

        let month_observations: Vec<&Observation> = observations
            .iter()
            .filter(|o| window.in_month(o.date))
            .collect();
        if month_observations.is_empty() {
            warn!(
                "None of {} observations fall in {}-{:02}",
                observations.len(),
                window.year,
                window.month
            );
            return Err(ReportError::NoRowsForMonth {
                year: window.year,
                month: window.month,
            });
        }

        let in_window = month_observations
            .iter()
            .filter(|o| window.day_of(o.date).is_some())
            .count();
        if in_window == 0 {
            return Err(ReportError::NoRowsInWindow {
                year: window.year,
                month: window.month,
                end_day: window.end_day,
            });
        }
        debug!(
            "{} observations in month, {} inside days 1..={}",
            month_observations.len(),
            in_window,
            window.end_day
        );

        let catalog = self.catalog.as_ref();
        let stations = catalog.stations();

        let grid = GridBuilder::new(catalog).build(month_observations.iter().copied(), &window);
        let classified = classify_grid(&grid);

        let display = WideTable::from_grid(&classified.display, &classified.columns);
        let numeric = WideTable::from_grid(&classified.numeric, &classified.columns);
        display.ensure_columns(stations)?;
        numeric.ensure_columns(stations)?;

        let qc = QcReport::analyze(&grid.presence, month_observations.iter().copied(), catalog);
        if !qc.unmapped_names.is_empty() {
            warn!(
                "{} station label(s) do not map to a canonical station",
                qc.unmapped_names.len()
            );
        }

        let run_indices = run_indices(&classified.numeric, stations, config.wet_threshold);
        let dashboard = Dashboard::build(
            &classified.numeric,
            stations,
            DashboardThresholds {
                rainy_mm: config.rainy_threshold,
                heavy_mm: config.heavy_threshold,
            },
        );

        info!(
            "Report ready for {}: {} stations, {} empty on last day",
            window,
            stations.len(),
            qc.empty_on_last_day.len()
        );

        Ok(ReportBundle {
            window,
            wet_threshold: config.wet_threshold,
            stations: stations.names().to_vec(),
            display,
            numeric,
            qc,
            run_indices,
            dashboard,
        })
    }
}
