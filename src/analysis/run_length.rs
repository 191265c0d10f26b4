/// Consecutive dry/wet day indices (CDD/CWD) and period maxima
///
/// Each station's numeric column is scanned as an ordered day series. A
/// missing value always breaks a run, whatever the value before it was.
use serde::Serialize;

use crate::catalog::CanonicalStationList;
use crate::grid::Grid;

/// Default wet-day threshold in millimetres (trace rainfall counts as wet)
pub const DEFAULT_WET_THRESHOLD_MM: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Dry,
    Wet,
}

/// The per-day condition a run is made of
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunCondition {
    pub kind: RunKind,
    pub wet_threshold: f64,
}

impl RunCondition {
    pub fn dry() -> Self {
        Self {
            kind: RunKind::Dry,
            wet_threshold: DEFAULT_WET_THRESHOLD_MM,
        }
    }

    pub fn wet(wet_threshold: f64) -> Self {
        Self {
            kind: RunKind::Wet,
            wet_threshold,
        }
    }

    pub fn holds(&self, mm: f64) -> bool {
        match self.kind {
            RunKind::Dry => mm == 0.0,
            RunKind::Wet => mm >= self.wet_threshold,
        }
    }
}

/// A run of consecutive days; start/end are absent for an empty run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSpan {
    pub length: u32,
    pub start_day: Option<u32>,
    pub end_day: Option<u32>,
}

impl RunSpan {
    fn new(start_day: u32, length: u32) -> Self {
        Self {
            length,
            start_day: Some(start_day),
            end_day: Some(start_day + length - 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState {
    Idle,
    Running { start: u32, length: u32 },
}

/// Fold accumulator for the longest-run scan
#[derive(Debug, Clone, Copy)]
struct RunScan {
    state: ScanState,
    best: RunSpan,
}

impl RunScan {
    fn start() -> Self {
        Self {
            state: ScanState::Idle,
            best: RunSpan::default(),
        }
    }

    fn step(self, day: u32, value: Option<f64>, condition: &RunCondition) -> Self {
        let state = match (self.state, value) {
            (_, None) => ScanState::Idle,
            (ScanState::Running { start, length }, Some(mm)) if condition.holds(mm) => {
                ScanState::Running {
                    start,
                    length: length + 1,
                }
            }
            (ScanState::Idle, Some(mm)) if condition.holds(mm) => ScanState::Running {
                start: day,
                length: 1,
            },
            (_, Some(_)) => ScanState::Idle,
        };

        // Strictly longer only: the first run of the maximal length is kept
        let best = match state {
            ScanState::Running { start, length } if length > self.best.length => {
                RunSpan::new(start, length)
            }
            _ => self.best,
        };

        Self { state, best }
    }
}

/// Longest run anywhere in the series (day 1 is index 0)
pub fn longest_run(series: &[Option<f64>], condition: &RunCondition) -> RunSpan {
    series
        .iter()
        .zip(1u32..)
        .fold(RunScan::start(), |scan, (value, day)| {
            scan.step(day, *value, condition)
        })
        .best
}

/// Run that ends exactly on the last day of the series, walking backwards
pub fn current_run(series: &[Option<f64>], condition: &RunCondition) -> RunSpan {
    let length = series
        .iter()
        .rev()
        .take_while(|value| matches!(value, Some(mm) if condition.holds(*mm)))
        .count() as u32;

    if length == 0 {
        return RunSpan::default();
    }
    let end_day = series.len() as u32;
    RunSpan::new(end_day - length + 1, length)
}

/// Largest value in the window and the day it first occurs (CH max)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodMax {
    pub value: Option<f64>,
    pub day: Option<u32>,
}

pub fn period_max(series: &[Option<f64>]) -> PeriodMax {
    series
        .iter()
        .zip(1u32..)
        .filter_map(|(value, day)| value.filter(|mm| mm.is_finite()).map(|mm| (mm, day)))
        .fold(PeriodMax::default(), |best, (mm, day)| match best.value {
            Some(current) if mm <= current => best,
            _ => PeriodMax {
                value: Some(mm),
                day: Some(day),
            },
        })
}

/// Run-length indices for one station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunIndexRow {
    pub station: String,
    pub longest_dry: RunSpan,
    pub longest_wet: RunSpan,
    pub current_dry: RunSpan,
    pub current_wet: RunSpan,
    pub ch_max: PeriodMax,
}

impl RunIndexRow {
    pub fn from_series(station: &str, series: &[Option<f64>], wet_threshold: f64) -> Self {
        let dry = RunCondition::dry();
        let wet = RunCondition::wet(wet_threshold);
        Self {
            station: station.to_string(),
            longest_dry: longest_run(series, &dry),
            longest_wet: longest_run(series, &wet),
            current_dry: current_run(series, &dry),
            current_wet: current_run(series, &wet),
            ch_max: period_max(series),
        }
    }
}

/// Index rows for every station, in canonical order
pub fn run_indices(
    numeric: &Grid<Option<f64>>,
    stations: &CanonicalStationList,
    wet_threshold: f64,
) -> Vec<RunIndexRow> {
    stations
        .iter()
        .enumerate()
        .map(|(column, station)| {
            let series: Vec<Option<f64>> = numeric.column(column).copied().collect();
            RunIndexRow::from_series(station, &series, wet_threshold)
        })
        .collect()
}
