// Station catalog module
//
// The catalog holds the process-wide read-only lookup tables:
// - the canonical station list, which fixes the column order of every report table
// - the alias map, which folds alternate spellings onto canonical names
// - station coordinates, joined by name for presentation only
//
// It is loaded once at startup and shared behind an Arc; nothing mutates it afterwards.

pub mod alias_map;
pub mod coordinates;
pub mod station_list;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use alias_map::{normalize_whitespace, AliasMap};
pub use coordinates::{LocatedStation, StationCoordinate};
pub use station_list::CanonicalStationList;

/// Catalog bundled with the binary, used when no catalog path is configured
const BUILTIN_CATALOG: &str = include_str!("../data/stations.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Canonical station list is empty")]
    EmptyStationList,

    #[error("Duplicate canonical station: {0}")]
    DuplicateStation(String),

    #[error("Invalid canonical station name {0:?} (must be non-empty with single internal spaces)")]
    InvalidStationName(String),

    #[error("Alias chain: '{alias}' maps to '{target}', which is itself an alias key")]
    AliasChain { alias: String, target: String },

    #[error("Conflicting alias '{alias}': maps to both '{first}' and '{second}'")]
    ConflictingAlias {
        alias: String,
        first: String,
        second: String,
    },
}

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    stations: Vec<String>,
    #[serde(default, deserialize_with = "alias_entries")]
    aliases: Vec<(String, String)>,
    #[serde(default)]
    coordinates: Vec<StationCoordinate>,
}

/// Read the alias object entry by entry, keeping repeated keys
///
/// A plain map would silently keep the last value of a repeated key and hide
/// a conflict from `AliasMap::new`.
fn alias_entries<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct AliasEntries;

    impl<'de> Visitor<'de> for AliasEntries {
        type Value = Vec<(String, String)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an object mapping alias names to canonical station names")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, String>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(AliasEntries)
}

/// Immutable station reference data shared by every report run
#[derive(Debug, Clone)]
pub struct StationCatalog {
    stations: CanonicalStationList,
    aliases: AliasMap,
    coordinates: Vec<StationCoordinate>,
}

impl StationCatalog {
    pub fn new<I, K, V>(
        stations: Vec<String>,
        aliases: I,
        coordinates: Vec<StationCoordinate>,
    ) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let stations = CanonicalStationList::new(stations)?;
        let aliases = AliasMap::new(aliases)?;

        debug!(
            "Catalog built: {} stations, {} aliases, {} coordinates",
            stations.len(),
            aliases.len(),
            coordinates.len()
        );

        Ok(Self {
            stations,
            aliases,
            coordinates,
        })
    }

    /// Parse a catalog from its JSON representation
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.stations, file.aliases, file.coordinates)
    }

    /// Load a catalog JSON file from disk
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Load from `path` when given, otherwise fall back to the built-in catalog
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = match path {
            Some(path) => {
                info!("Loading station catalog from {}", path.display());
                Self::from_path(path)?
            }
            None => {
                info!("Using built-in station catalog");
                Self::builtin()?
            }
        };

        info!(
            "Station catalog loaded: {} canonical stations, {} aliases",
            catalog.stations.len(),
            catalog.aliases.len()
        );
        Ok(catalog)
    }

    pub fn stations(&self) -> &CanonicalStationList {
        &self.stations
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    /// Canonical label for a raw station name (may lie outside the canonical list)
    pub fn canonicalize(&self, raw_name: &str) -> String {
        self.aliases.canonicalize(raw_name)
    }

    /// Column index of a canonical label, if it is one of the official stations
    pub fn column_of(&self, label: &str) -> Option<usize> {
        self.stations.position(label)
    }

    pub fn coordinates_for(&self, station: &str) -> Option<&StationCoordinate> {
        self.coordinates.iter().find(|c| c.name == station)
    }

    /// Canonical stations in column order, each joined with its coordinates when known
    pub fn located_stations(&self) -> Vec<LocatedStation> {
        self.stations
            .iter()
            .enumerate()
            .map(|(column, name)| LocatedStation {
                column,
                name: name.to_string(),
                coordinate: self.coordinates_for(name).cloned(),
            })
            .collect()
    }
}
