use std::env;
use std::path::PathBuf;

use crate::analysis::dashboard::{DEFAULT_HEAVY_THRESHOLD_MM, DEFAULT_RAINY_THRESHOLD_MM};
use crate::analysis::run_length::DEFAULT_WET_THRESHOLD_MM;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Station catalog JSON; the built-in catalog is used when unset
    pub station_catalog_path: Option<PathBuf>,
    pub wet_threshold_mm: f64,
    pub heavy_threshold_mm: f64,
    pub rainy_threshold_mm: f64,
}

/// Thresholds applied to report requests that leave them out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdDefaults {
    pub wet_mm: f64,
    pub heavy_mm: f64,
    pub rainy_mm: f64,
}

impl Default for ThresholdDefaults {
    fn default() -> Self {
        Self {
            wet_mm: DEFAULT_WET_THRESHOLD_MM,
            heavy_mm: DEFAULT_HEAVY_THRESHOLD_MM,
            rainy_mm: DEFAULT_RAINY_THRESHOLD_MM,
        }
    }
}

fn threshold_from_env(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let station_catalog_path = match env::var("STATION_CATALOG_PATH") {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            Ok(_) | Err(env::VarError::NotPresent) => None,
            Err(e) => return Err(e),
        };

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            station_catalog_path,
            wet_threshold_mm: threshold_from_env("WET_THRESHOLD_MM", DEFAULT_WET_THRESHOLD_MM),
            heavy_threshold_mm: threshold_from_env(
                "HEAVY_THRESHOLD_MM",
                DEFAULT_HEAVY_THRESHOLD_MM,
            ),
            rainy_threshold_mm: threshold_from_env(
                "RAINY_THRESHOLD_MM",
                DEFAULT_RAINY_THRESHOLD_MM,
            ),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn threshold_defaults(&self) -> ThresholdDefaults {
        ThresholdDefaults {
            wet_mm: self.wet_threshold_mm,
            heavy_mm: self.heavy_threshold_mm,
            rainy_mm: self.rainy_threshold_mm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            station_catalog_path: None,
            wet_threshold_mm: 0.1,
            heavy_threshold_mm: 50.0,
            rainy_threshold_mm: 1.0,
        };
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
        assert_eq!(config.threshold_defaults().heavy_mm, 50.0);
    }

    #[test]
    fn test_threshold_defaults() {
        let defaults = ThresholdDefaults::default();
        assert_eq!(defaults.wet_mm, 0.1);
        assert_eq!(defaults.heavy_mm, 20.0);
        assert_eq!(defaults.rainy_mm, 1.0);
    }

    #[test]
    fn test_threshold_from_env_falls_back_on_unset_key() {
        assert_eq!(
            threshold_from_env("RAIN_BULLETIN_TEST_UNSET_THRESHOLD", 7.5),
            7.5
        );
    }
}
