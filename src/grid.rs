// Dense day × station grids
//
// Observations arrive as vertical (station, date, value) rows; the grid
// module turns them into fixed-shape matrices whose columns follow the
// canonical station list and whose rows cover every day of the window.

pub mod builder;
pub mod classifier;
pub mod matrix;

use serde::Serialize;

pub use builder::{GridBuilder, ObservationGrid};
pub use classifier::{classify, classify_grid, CellClass, ClassifiedGrid};
pub use matrix::Grid;

use crate::catalog::CanonicalStationList;
use crate::error::ReportError;

/// One output row of a wide table: the day number followed by one cell per station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideRow<T> {
    pub day: u32,
    pub values: Vec<T>,
}

/// A grid laid out for output, with its station header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideTable<T> {
    pub stations: Vec<String>,
    pub rows: Vec<WideRow<T>>,
}

impl<T: Clone> WideTable<T> {
    /// Lay out a grid under the column labels it was built with
    pub fn from_grid(grid: &Grid<T>, columns: &[String]) -> Self {
        let rows = grid
            .days()
            .map(|day| WideRow {
                day,
                values: grid.row(day).map(<[T]>::to_vec).unwrap_or_default(),
            })
            .collect();

        Self {
            stations: columns.to_vec(),
            rows,
        }
    }
}

impl<T> WideTable<T> {
    /// Fail loudly if the header or any row drifted from the canonical columns
    ///
    /// The header comes from the grid, so a grid built against a different
    /// station list (or reordered on the way) is caught here.
    pub fn ensure_columns(&self, stations: &CanonicalStationList) -> Result<(), ReportError> {
        let rows_aligned = self
            .rows
            .iter()
            .all(|row| row.values.len() == stations.len());

        if self.stations != stations.names() || !rows_aligned {
            return Err(ReportError::ColumnOrder {
                expected: stations.names().to_vec(),
                found: self.stations.clone(),
            });
        }
        Ok(())
    }
}
