/// Dashboard aggregates over the numeric grid
///
/// Plain sums and counts; missing cells are skipped everywhere.
use serde::Serialize;

use crate::catalog::CanonicalStationList;
use crate::grid::Grid;

pub const DEFAULT_RAINY_THRESHOLD_MM: f64 = 1.0;
pub const DEFAULT_HEAVY_THRESHOLD_MM: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardThresholds {
    pub rainy_mm: f64,
    pub heavy_mm: f64,
}

impl Default for DashboardThresholds {
    fn default() -> Self {
        Self {
            rainy_mm: DEFAULT_RAINY_THRESHOLD_MM,
            heavy_mm: DEFAULT_HEAVY_THRESHOLD_MM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub station: String,
    pub total_mm: f64,
    pub valid_days: u32,
    pub rainy_days: u32,
    pub heavy_days: u32,
    pub max_mm: Option<f64>,
    pub max_day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub day: u32,
    pub total_mm: f64,
    pub mean_mm: Option<f64>,
    pub valid_stations: u32,
    pub rainy_stations: u32,
    pub heavy_stations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WettestStation {
    pub station: String,
    pub total_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WettestDay {
    pub day: u32,
    pub total_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlights {
    pub wettest_station: Option<WettestStation>,
    pub wettest_day: Option<WettestDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub thresholds: DashboardThresholds,
    pub stations: Vec<StationSummary>,
    pub days: Vec<DaySummary>,
    pub highlights: Highlights,
}

/// Running totals over a set of cells
#[derive(Debug, Default)]
struct Tally {
    total: f64,
    valid: u32,
    rainy: u32,
    heavy: u32,
}

impl Tally {
    fn of<'a>(values: impl Iterator<Item = &'a Option<f64>>, thresholds: &DashboardThresholds) -> Self {
        values.flatten().fold(Self::default(), |mut tally, mm| {
            tally.total += mm;
            tally.valid += 1;
            if *mm >= thresholds.rainy_mm {
                tally.rainy += 1;
            }
            if *mm >= thresholds.heavy_mm {
                tally.heavy += 1;
            }
            tally
        })
    }
}

impl Dashboard {
    pub fn build(
        numeric: &Grid<Option<f64>>,
        stations: &CanonicalStationList,
        thresholds: DashboardThresholds,
    ) -> Self {
        let station_rows = station_summaries(numeric, stations, &thresholds);
        let day_rows = day_summaries(numeric, &thresholds);
        let highlights = Highlights {
            wettest_station: wettest_station(&station_rows),
            wettest_day: wettest_day(&day_rows),
        };

        Self {
            thresholds,
            stations: station_rows,
            days: day_rows,
            highlights,
        }
    }
}

fn station_summaries(
    numeric: &Grid<Option<f64>>,
    stations: &CanonicalStationList,
    thresholds: &DashboardThresholds,
) -> Vec<StationSummary> {
    stations
        .iter()
        .enumerate()
        .map(|(column, station)| {
            let tally = Tally::of(numeric.column(column), thresholds);

            // Earliest day wins on ties
            let max = numeric
                .column(column)
                .zip(numeric.days())
                .filter_map(|(value, day)| value.map(|mm| (mm, day)))
                .fold(None, |best: Option<(f64, u32)>, (mm, day)| match best {
                    Some((current, _)) if mm <= current => best,
                    _ => Some((mm, day)),
                });

            StationSummary {
                station: station.to_string(),
                total_mm: tally.total,
                valid_days: tally.valid,
                rainy_days: tally.rainy,
                heavy_days: tally.heavy,
                max_mm: max.map(|(mm, _)| mm),
                max_day: max.map(|(_, day)| day),
            }
        })
        .collect()
}

fn day_summaries(numeric: &Grid<Option<f64>>, thresholds: &DashboardThresholds) -> Vec<DaySummary> {
    numeric
        .days()
        .map(|day| {
            let row = numeric.row(day).unwrap_or(&[]);
            let tally = Tally::of(row.iter(), thresholds);
            DaySummary {
                day,
                total_mm: tally.total,
                mean_mm: (tally.valid > 0).then(|| tally.total / f64::from(tally.valid)),
                valid_stations: tally.valid,
                rainy_stations: tally.rainy,
                heavy_stations: tally.heavy,
            }
        })
        .collect()
}

/// Highest station total; alphabetical on ties; stations without data never qualify
fn wettest_station(rows: &[StationSummary]) -> Option<WettestStation> {
    rows.iter()
        .filter(|row| row.valid_days > 0)
        .max_by(|a, b| {
            a.total_mm
                .total_cmp(&b.total_mm)
                .then_with(|| b.station.cmp(&a.station))
        })
        .map(|row| WettestStation {
            station: row.station.clone(),
            total_mm: row.total_mm,
        })
}

/// Highest daily total; earliest day on ties
fn wettest_day(rows: &[DaySummary]) -> Option<WettestDay> {
    rows.iter()
        .filter(|row| row.valid_stations > 0)
        .fold(None, |best: Option<&DaySummary>, row| match best {
            Some(current) if row.total_mm <= current.total_mm => best,
            _ => Some(row),
        })
        .map(|row| WettestDay {
            day: row.day,
            total_mm: row.total_mm,
        })
}
