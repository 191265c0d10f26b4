/// Daily rainfall observations and the row parser shared by every source format
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Column headers every source must provide
pub const STATION_COLUMN: &str = "NAME";
pub const TIMESTAMP_COLUMN: &str = "DATA TIMESTAMP";
pub const RAINFALL_COLUMN: &str = "RAINFALL DAY MM";

pub const REQUIRED_COLUMNS: [&str; 3] = [STATION_COLUMN, TIMESTAMP_COLUMN, RAINFALL_COLUMN];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Logger stamps with a UTC offset; the date is taken in that offset
const OFFSET_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// A single station/day rainfall record as ingested
///
/// `rainfall` is `None` when the source cell was blank or unparsable; the
/// sentinel codes (8888 trace, 9999 instrument fault) stay as numbers here
/// and are interpreted by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station_name: String,
    pub date: NaiveDate,
    pub rainfall: Option<f64>,
    pub source: String,
}

/// A rainfall cell before parsing: spreadsheets hand us numbers, CSV and JSON text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

/// One tabular row with the three required fields, still unparsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub station_name: String,
    pub timestamp: String,
    #[serde(default)]
    pub rainfall: Option<RawValue>,
}

impl RawRow {
    /// Convert into an observation, or `None` when the timestamp cannot be parsed
    pub fn into_observation(self, source: &str) -> Option<Observation> {
        let date = parse_timestamp(&self.timestamp)?;
        Some(Observation {
            station_name: self.station_name,
            date,
            rainfall: parse_rainfall(self.rainfall.as_ref()),
            source: source.to_string(),
        })
    }
}

/// Parse a date or date-time string, keeping only the calendar date
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use rain_bulletin_service::observation::parse_timestamp;
///
/// let expected = NaiveDate::from_ymd_opt(2025, 2, 14);
/// assert_eq!(parse_timestamp("2025-02-14"), expected);
/// assert_eq!(parse_timestamp("2025-02-14 07:00:00"), expected);
/// assert_eq!(parse_timestamp("14/02/2025"), expected);
/// assert_eq!(parse_timestamp("not a date"), None);
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .or_else(|| {
                    OFFSET_DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok())
                })
                .map(|dt| dt.date_naive())
        })
}

/// Parse a rainfall cell; blank or unparsable text becomes `None`
pub fn parse_rainfall(value: Option<&RawValue>) -> Option<f64> {
    match value {
        Some(RawValue::Number(n)) if n.is_finite() => Some(*n),
        Some(RawValue::Number(_)) => None,
        Some(RawValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite()),
        None => None,
    }
}
