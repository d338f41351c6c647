//! Formula 1 race-weekend feature engineering
//!
//! Builds the feature table for a race-outcome prediction model from
//! historical session telemetry, hand-curated pace estimates and a
//! weather forecast.

pub mod data;
pub mod features;
pub mod pipeline;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Three-letter driver abbreviation, the join key across all tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriverId(pub String);

impl DriverId {
    pub fn new(code: &str) -> Self {
        DriverId(code.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DriverId {
    fn from(code: &str) -> Self {
        DriverId::new(code)
    }
}

/// A single timed lap from a session, durations in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LapRecord {
    pub driver: DriverId,
    pub lap_time_s: f64,
    pub sector1_s: f64,
    pub sector2_s: f64,
    pub sector3_s: f64,
}

impl LapRecord {
    /// Sum of the three sector times
    pub fn sector_total(&self) -> f64 {
        self.sector1_s + self.sector2_s + self.sector3_s
    }
}

/// Weather conditions at the configured forecast slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceWeather {
    /// Precipitation probability in [0, 1]
    pub rain_probability: f64,
    /// Air temperature in degrees Celsius
    pub temperature_c: f64,
}

impl Default for RaceWeather {
    /// Dry and mild, used whenever the forecast is unavailable
    fn default() -> Self {
        RaceWeather {
            rain_probability: 0.0,
            temperature_c: 20.0,
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Session load failed for {season} {event} {session_type}: {message}")]
    SessionLoad {
        season: u16,
        event: String,
        session_type: String,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, PredictorError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    pub weather: WeatherConfig,
    pub data: DataConfig,
}

/// Identity of the historical session providing sector telemetry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub season: u16,
    pub event: String,
    /// Session code: "R" race, "Q" qualifying, "FP1".."FP3" practice
    pub session_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub endpoint: String,
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Exact forecast slot to read, "YYYY-MM-DD HH:MM:SS"
    pub forecast_slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub timing_endpoint: String,
    pub cache_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            session: SessionConfig {
                season: 2024,
                event: "Saudi Arabia".to_string(),
                session_type: "R".to_string(),
            },
            weather: WeatherConfig {
                endpoint: "http://api.openweathermap.org/data/2.5/forecast".to_string(),
                api_key: String::new(),
                latitude: 21.4225,
                longitude: 39.1818,
                forecast_slot: "2025-04-20 18:00:00".to_string(),
            },
            data: DataConfig {
                timing_endpoint: "https://timing.gridpred.dev/v1".to_string(),
                cache_dir: "f1_cache".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PredictorError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| PredictorError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PredictorError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_id_normalizes() {
        assert_eq!(DriverId::new(" ver "), DriverId("VER".to_string()));
        assert_eq!(DriverId::from("Ham").as_str(), "HAM");
    }

    #[test]
    fn test_default_weather_is_dry_and_mild() {
        let w = RaceWeather::default();
        assert_eq!(w.rain_probability, 0.0);
        assert_eq!(w.temperature_c, 20.0);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.session.season, 2024);
        assert_eq!(parsed.session.event, "Saudi Arabia");
        assert_eq!(parsed.weather.forecast_slot, "2025-04-20 18:00:00");
    }
}
