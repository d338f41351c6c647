//! Weather forecast lookup
//!
//! One forecast query against an OpenWeatherMap-style endpoint, read at a
//! single exact timestamp slot. Weather is an enrichment feature, not a
//! required input: every failure collapses to dry defaults at the point of
//! use, but the distinct cases are kept apart in [`WeatherLookup`] and in
//! the logs.

use crate::{PredictorError, RaceWeather, Result, WeatherConfig};
use chrono::NaiveDateTime;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    /// Slot timestamp text, "YYYY-MM-DD HH:MM:SS"
    pub dt_txt: String,
    /// Precipitation probability in [0, 1]
    #[serde(default)]
    pub pop: f64,
    pub main: ForecastMain,
}

#[derive(Debug, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
}

/// Outcome of a forecast lookup
#[derive(Debug, Clone)]
pub enum WeatherLookup {
    /// The configured slot was present in the forecast list
    Observed(RaceWeather),
    /// Fetch succeeded but no entry matched the configured slot
    SlotMissing,
    /// Network error or malformed payload
    Unavailable(String),
}

impl WeatherLookup {
    /// Conditions to feed into the pipeline
    ///
    /// Non-observed outcomes degrade to the dry/mild default rather than
    /// aborting the run.
    pub fn conditions(&self) -> RaceWeather {
        match self {
            WeatherLookup::Observed(weather) => *weather,
            WeatherLookup::SlotMissing | WeatherLookup::Unavailable(_) => RaceWeather::default(),
        }
    }

    pub fn is_observed(&self) -> bool {
        matches!(self, WeatherLookup::Observed(_))
    }
}

/// Client for the forecast endpoint
pub struct WeatherClient {
    client: reqwest::blocking::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent("gridpred/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        WeatherClient { client, config }
    }

    /// Fetch the forecast and read the configured slot
    ///
    /// Never returns an error; failures are folded into the lookup outcome.
    pub fn fetch_forecast(&self) -> WeatherLookup {
        if let Err(e) = validate_slot(&self.config.forecast_slot) {
            log::warn!("Bad forecast slot in config: {}", e);
            return WeatherLookup::Unavailable(e.to_string());
        }

        match self.try_fetch() {
            Ok(Some(weather)) => {
                log::info!(
                    "Forecast for {}: rain {:.0}%, {:.1} C",
                    self.config.forecast_slot,
                    weather.rain_probability * 100.0,
                    weather.temperature_c
                );
                WeatherLookup::Observed(weather)
            }
            Ok(None) => {
                log::warn!(
                    "No forecast entry for slot {}, using dry defaults",
                    self.config.forecast_slot
                );
                WeatherLookup::SlotMissing
            }
            Err(e) => {
                log::warn!("Weather fetch failed ({}), using dry defaults", e);
                WeatherLookup::Unavailable(e.to_string())
            }
        }
    }

    fn try_fetch(&self) -> Result<Option<RaceWeather>> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("lat", self.config.latitude.to_string()),
                ("lon", self.config.longitude.to_string()),
                ("appid", self.config.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()?;

        let payload: ForecastResponse = response.json()?;
        Ok(slot_conditions(&payload, &self.config.forecast_slot))
    }
}

/// Find the entry matching the exact slot text
pub fn slot_conditions(payload: &ForecastResponse, slot: &str) -> Option<RaceWeather> {
    payload.list.iter().find(|entry| entry.dt_txt == slot).map(|entry| RaceWeather {
        rain_probability: entry.pop,
        temperature_c: entry.main.temp,
    })
}

fn validate_slot(slot: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(slot, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| PredictorError::Parse(format!("forecast slot {:?}: {}", slot, e)))
}
