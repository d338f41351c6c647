//! One-shot weekend pipeline
//!
//! Wires the session loader, sector aggregator, estimates and weather
//! lookup into a single synchronous pass over the data.

pub mod report;

use crate::data::{SessionLoader, WeatherClient, WeatherLookup};
use crate::features::{build_feature_table, FeatureTable, RaceEstimates, SectorAggregator};
use crate::{Config, Result};

/// Everything one run produces
pub struct WeekendRun {
    pub table: FeatureTable,
    pub weather: WeatherLookup,
    /// Complete laps behind the sector aggregates
    pub lap_count: usize,
    /// Drivers with at least one complete lap
    pub covered_drivers: usize,
}

/// Run the full feature-engineering pass for one weekend
///
/// Session telemetry is required: a load failure aborts the run. The
/// weather lookup can never fail the run; it degrades to dry defaults.
pub fn run(config: &Config, estimates: &RaceEstimates, offline: bool) -> Result<WeekendRun> {
    let loader = SessionLoader::new(&config.data.timing_endpoint)
        .with_cache(&config.data.cache_dir)
        .offline_only(offline);

    let laps = loader.load(&config.session)?;
    let sectors = SectorAggregator::from_laps(&laps);
    log::info!(
        "Aggregated {} laps across {} drivers",
        sectors.lap_count(),
        sectors.driver_count()
    );

    let weather = WeatherClient::new(config.weather.clone()).fetch_forecast();
    let table = build_feature_table(estimates, &sectors, weather.conditions());

    Ok(WeekendRun {
        lap_count: sectors.lap_count(),
        covered_drivers: sectors.driver_count(),
        table,
        weather,
    })
}
