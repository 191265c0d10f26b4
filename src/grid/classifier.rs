/// BMKG cell classification
///
/// Maps a cell's first-seen raw value and its presence flag to a numeric
/// value (for indices and sums) and a display symbol (for the bulletin).
use serde::Serialize;

use super::{Grid, ObservationGrid};
use crate::utils::format_rainfall;

/// Sentinel code for trace rainfall (below measurable)
pub const TRACE_CODE: f64 = 8888.0;
/// Sentinel code for an instrument that produced no usable reading
pub const FAULT_CODE: f64 = 9999.0;
/// Numeric stand-in for trace rainfall, in millimetres
pub const TRACE_MM: f64 = 0.1;

pub const NO_DATA_SYMBOL: &str = "x";
pub const NO_RAIN_SYMBOL: &str = "-";
pub const TRACE_SYMBOL: &str = "0";

/// Outcome of classifying one cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CellClass {
    /// No observation targeted the cell
    NoObservation,
    /// An observation exists but its value was blank or unparsable
    Unreadable,
    /// Observed, no rain (raw 0)
    NoRain,
    /// Trace rainfall (raw 8888)
    Trace,
    /// Instrument fault (raw 9999)
    InstrumentFault,
    /// Measured positive rainfall in millimetres
    Measured(f64),
    /// Negative or otherwise undefined code; reported as no data
    OutOfDomain,
}

impl CellClass {
    pub fn numeric(&self) -> Option<f64> {
        match self {
            CellClass::NoRain => Some(0.0),
            CellClass::Trace => Some(TRACE_MM),
            CellClass::Measured(mm) => Some(*mm),
            CellClass::NoObservation
            | CellClass::Unreadable
            | CellClass::InstrumentFault
            | CellClass::OutOfDomain => None,
        }
    }

    pub fn symbol(&self) -> String {
        match self {
            CellClass::NoRain => NO_RAIN_SYMBOL.to_string(),
            CellClass::Trace => TRACE_SYMBOL.to_string(),
            CellClass::Measured(mm) => format_rainfall(*mm),
            CellClass::NoObservation
            | CellClass::Unreadable
            | CellClass::InstrumentFault
            | CellClass::OutOfDomain => NO_DATA_SYMBOL.to_string(),
        }
    }
}

/// Classify one cell; rules are checked in order
pub fn classify(raw: Option<f64>, present: bool) -> CellClass {
    if !present {
        return CellClass::NoObservation;
    }
    let Some(value) = raw.filter(|v| v.is_finite()) else {
        return CellClass::Unreadable;
    };

    if value == 0.0 {
        CellClass::NoRain
    } else if value == TRACE_CODE {
        CellClass::Trace
    } else if value == FAULT_CODE {
        CellClass::InstrumentFault
    } else if value > 0.0 {
        CellClass::Measured(value)
    } else {
        CellClass::OutOfDomain
    }
}

/// Numeric and display grids derived from raw + presence
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedGrid {
    pub classes: Grid<CellClass>,
    pub numeric: Grid<Option<f64>>,
    pub display: Grid<String>,
    /// Station labels carried over from the observation grid
    pub columns: Vec<String>,
}

pub fn classify_grid(grid: &ObservationGrid) -> ClassifiedGrid {
    let classes = grid
        .raw
        .zip_map(&grid.presence, |raw, present| classify(*raw, *present));

    ClassifiedGrid {
        numeric: classes.map(CellClass::numeric),
        display: classes.map(CellClass::symbol),
        classes,
        columns: grid.columns.clone(),
    }
}
