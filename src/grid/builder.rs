use tracing::{debug, instrument};

use super::Grid;
use crate::catalog::StationCatalog;
use crate::observation::Observation;
use crate::window::ReportingWindow;

/// Raw value and presence grids for one reporting window
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationGrid {
    /// First-seen rainfall value per cell (`None` for blank/unparsable or no observation)
    pub raw: Grid<Option<f64>>,
    /// Whether at least one observation targeted the cell, valid or not
    pub presence: Grid<bool>,
    /// Station label of each column, as resolved when the grid was built
    pub columns: Vec<String>,
}

impl ObservationGrid {
    pub fn end_day(&self) -> u32 {
        self.presence.end_day()
    }
}

/// Pivots vertical observations into dense grids in canonical column order
pub struct GridBuilder<'a> {
    catalog: &'a StationCatalog,
}

impl<'a> GridBuilder<'a> {
    pub fn new(catalog: &'a StationCatalog) -> Self {
        Self { catalog }
    }

    /// Build the raw and presence grids
    ///
    /// Observations are visited in input order. The first observation for a
    /// (day, station) cell fixes its raw value; later ones only confirm
    /// presence. Observations outside the window or with a non-canonical
    /// station label are left out of the grid.
    #[instrument(skip(self, observations), fields(window = %window))]
    pub fn build<'o, I>(&self, observations: I, window: &ReportingWindow) -> ObservationGrid
    where
        I: IntoIterator<Item = &'o Observation>,
    {
        let columns = self.catalog.stations().names().to_vec();
        let width = columns.len();
        let mut raw = Grid::filled(window.end_day, width, None);
        let mut presence = Grid::filled(window.end_day, width, false);

        let mut placed = 0usize;
        let mut duplicates = 0usize;
        let mut outside_window = 0usize;
        let mut unmapped = 0usize;

        for observation in observations {
            let Some(day) = window.day_of(observation.date) else {
                outside_window += 1;
                continue;
            };

            let label = self.catalog.canonicalize(&observation.station_name);
            let Some(column) = self.catalog.column_of(&label) else {
                unmapped += 1;
                continue;
            };

            match presence.get_mut(day, column) {
                Some(seen) if *seen => duplicates += 1,
                Some(seen) => {
                    *seen = true;
                    if let Some(cell) = raw.get_mut(day, column) {
                        *cell = observation.rainfall;
                    }
                    placed += 1;
                }
                None => outside_window += 1,
            }
        }

        debug!(
            "Grid {}x{}: {} cells filled, {} duplicates ignored, {} outside window, {} unmapped",
            window.end_day, width, placed, duplicates, outside_window, unmapped
        );

        ObservationGrid {
            raw,
            presence,
            columns,
        }
    }
}
