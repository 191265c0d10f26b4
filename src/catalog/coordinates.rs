use serde::{Deserialize, Serialize};

/// Station location metadata, joined by canonical name for map presentation
///
/// The report pipeline never reads these; they ride along in the catalog so
/// API clients can place stations on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCoordinate {
    pub station_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation_m: Option<f64>,
}

/// A canonical station with its column position and optional location
#[derive(Debug, Clone, Serialize)]
pub struct LocatedStation {
    pub column: usize,
    pub name: String,
    pub coordinate: Option<StationCoordinate>,
}
