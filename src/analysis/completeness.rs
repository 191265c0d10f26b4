/// Data-quality (QC) analysis
///
/// All tables are derived read-only from the presence grid (and, for
/// unmapped names, from the month's observations). Sort orders put the
/// most actionable rows first.
use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::{CanonicalStationList, StationCatalog};
use crate::grid::Grid;
use crate::observation::Observation;
use crate::utils::round_to_tenth;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationCompleteness {
    pub station: String,
    pub days_present: u32,
    pub total_days: u32,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCompleteness {
    pub day: u32,
    pub stations_present: u32,
    pub total_stations: u32,
    pub pct: f64,
}

/// A raw station label whose canonical form is not an official station
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnmappedName {
    pub raw_name: String,
    pub canonical_attempt: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapRecord {
    pub station: String,
    pub has_any_record: bool,
    pub last_present_day: Option<u32>,
    pub gap_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyOnLastDay {
    pub station: String,
    pub last_present_day: Option<u32>,
    pub empty_days: u32,
}

/// Every QC table for one report run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QcReport {
    pub station_completeness: Vec<StationCompleteness>,
    pub day_completeness: Vec<DayCompleteness>,
    pub unmapped_names: Vec<UnmappedName>,
    pub gaps: Vec<GapRecord>,
    pub empty_on_last_day: Vec<EmptyOnLastDay>,
}

impl QcReport {
    pub fn analyze<'o, I>(presence: &Grid<bool>, observations: I, catalog: &StationCatalog) -> Self
    where
        I: IntoIterator<Item = &'o Observation>,
    {
        let stations = catalog.stations();
        Self {
            station_completeness: station_completeness(presence, stations),
            day_completeness: day_completeness(presence, stations),
            unmapped_names: unmapped_names(observations, catalog),
            gaps: gap_analysis(presence, stations),
            empty_on_last_day: empty_on_last_day(presence, stations),
        }
    }
}

fn pct(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to_tenth(f64::from(part) / f64::from(whole) * 100.0)
}

/// Latest day with an observation in a column
fn last_present_day(presence: &Grid<bool>, column: usize) -> Option<u32> {
    presence
        .column(column)
        .zip(presence.days())
        .filter(|(present, _)| **present)
        .map(|(_, day)| day)
        .last()
}

/// Days since the last observation, or the whole window if there never was one
fn days_since(end_day: u32, last: Option<u32>) -> u32 {
    match last {
        Some(day) => end_day - day,
        None => end_day,
    }
}

/// Per-station coverage, worst first (ties by station name)
pub fn station_completeness(
    presence: &Grid<bool>,
    stations: &CanonicalStationList,
) -> Vec<StationCompleteness> {
    let total_days = presence.end_day();
    let mut rows: Vec<StationCompleteness> = stations
        .iter()
        .enumerate()
        .map(|(column, station)| {
            let days_present = presence.column(column).filter(|p| **p).count() as u32;
            StationCompleteness {
                station: station.to_string(),
                days_present,
                total_days,
                pct: pct(days_present, total_days),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.pct.total_cmp(&b.pct).then_with(|| a.station.cmp(&b.station)));
    rows
}

/// Per-day coverage across stations, in day order
pub fn day_completeness(
    presence: &Grid<bool>,
    stations: &CanonicalStationList,
) -> Vec<DayCompleteness> {
    let total_stations = stations.len() as u32;
    presence
        .days()
        .map(|day| {
            let stations_present = presence
                .row(day)
                .map(|row| row.iter().filter(|p| **p).count() as u32)
                .unwrap_or(0);
            DayCompleteness {
                day,
                stations_present,
                total_stations,
                pct: pct(stations_present, total_stations),
            }
        })
        .collect()
}

/// Distinct (raw, canonical attempt, source) triples that miss the canonical list
///
/// Sorted by canonical attempt, then raw name, then source.
pub fn unmapped_names<'o, I>(observations: I, catalog: &StationCatalog) -> Vec<UnmappedName>
where
    I: IntoIterator<Item = &'o Observation>,
{
    let mut seen: BTreeSet<(String, String, String)> = BTreeSet::new();
    for observation in observations {
        let canonical = catalog.canonicalize(&observation.station_name);
        if catalog.stations().contains(&canonical) {
            continue;
        }
        seen.insert((
            canonical,
            observation.station_name.clone(),
            observation.source.clone(),
        ));
    }

    seen.into_iter()
        .map(|(canonical_attempt, raw_name, source)| UnmappedName {
            raw_name,
            canonical_attempt,
            source,
        })
        .collect()
}

/// Last observed day and trailing gap per station, in catalog order
pub fn gap_analysis(presence: &Grid<bool>, stations: &CanonicalStationList) -> Vec<GapRecord> {
    let end_day = presence.end_day();
    stations
        .iter()
        .enumerate()
        .map(|(column, station)| {
            let last = last_present_day(presence, column);
            GapRecord {
                station: station.to_string(),
                has_any_record: last.is_some(),
                last_present_day: last,
                gap_days: days_since(end_day, last),
            }
        })
        .collect()
}

/// Stations with nothing on the window's last day, most overdue first
pub fn empty_on_last_day(
    presence: &Grid<bool>,
    stations: &CanonicalStationList,
) -> Vec<EmptyOnLastDay> {
    let end_day = presence.end_day();
    let mut rows: Vec<EmptyOnLastDay> = stations
        .iter()
        .enumerate()
        .filter(|(column, _)| presence.get(end_day, *column) != Some(&true))
        .map(|(column, station)| {
            let last = last_present_day(presence, column);
            EmptyOnLastDay {
                station: station.to_string(),
                last_present_day: last,
                empty_days: days_since(end_day, last),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.empty_days
            .cmp(&a.empty_days)
            .then_with(|| a.station.cmp(&b.station))
    });
    rows
}
