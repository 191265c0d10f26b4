#![allow(dead_code)]

use chrono::NaiveDate;
use rain_bulletin_service::catalog::StationCatalog;
use rain_bulletin_service::observation::Observation;
use rain_bulletin_service::services::ReportService;
use std::sync::Arc;

pub const BOGOR: &str = "Stasiun Klimatologi Bogor";
pub const CIAWI: &str = "Pos Hujan Ciawi";
pub const DRAMAGA: &str = "Pos Hujan Dramaga";

/// Three-station catalog with a couple of aliases
pub fn test_catalog() -> StationCatalog {
    StationCatalog::new(
        vec![BOGOR.to_string(), CIAWI.to_string(), DRAMAGA.to_string()],
        [
            ("STAKLIM BOGOR", BOGOR),
            ("PH Ciawi", CIAWI),
            ("Darmaga", DRAMAGA),
        ],
        Vec::new(),
    )
    .expect("test catalog is valid")
}

pub fn test_service() -> ReportService {
    ReportService::new(Arc::new(test_catalog()))
}

/// Observation from a single test source
pub fn obs(station: &str, year: i32, month: u32, day: u32, rainfall: Option<f64>) -> Observation {
    obs_from(station, year, month, day, rainfall, "march.csv")
}

pub fn obs_from(
    station: &str,
    year: i32,
    month: u32,
    day: u32,
    rainfall: Option<f64>,
    source: &str,
) -> Observation {
    Observation {
        station_name: station.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day).expect("valid test date"),
        rainfall,
        source: source.to_string(),
    }
}

/// CSV export text in the operator's column layout
pub fn observation_csv(rows: &[(&str, &str, &str)]) -> String {
    let mut csv = String::from("NAME,DATA TIMESTAMP,RAINFALL DAY MM\n");
    for (name, timestamp, rainfall) in rows {
        csv.push_str(&format!("{name},{timestamp},{rainfall}\n"));
    }
    csv
}
