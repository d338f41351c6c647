//! Feature merge and conditioning
//!
//! Left-joins the qualifying estimate table with the sector aggregates and
//! weather into the final model-ready matrix. Every qualifying-table row
//! survives the join; gaps are imputed, never dropped.

use crate::features::estimates::RaceEstimates;
use crate::features::sectors::SectorAggregator;
use crate::{DriverId, RaceWeather};
use serde::Serialize;

/// Rain probability at or above which wet scaling applies
pub const RAIN_THRESHOLD: f64 = 0.75;

/// One fully conditioned feature row
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRow {
    pub driver: DriverId,
    /// Team affiliation; None when the driver has no mapping
    pub team: Option<String>,
    /// Raw qualifying estimate, seconds
    pub qualifying_time_s: f64,
    /// Qualifying time after wet scaling, squared
    pub qualifying_time_sq: f64,
    pub wet_performance_factor: f64,
    pub team_performance_score: f64,
    pub season_average_s: f64,
    /// Mean total sector time, imputed for drivers without session laps
    pub total_sector_time_s: f64,
    pub rain_probability: f64,
    pub temperature_c: f64,
    /// 1 when the driver won the previous edition of this race
    pub last_year_winner: u8,
}

/// The assembled feature matrix, one row per qualifying-table driver
#[derive(Debug, Clone, Serialize)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, driver: &DriverId) -> Option<&FeatureRow> {
        self.rows.iter().find(|row| &row.driver == driver)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRow> {
        self.rows.iter()
    }
}

/// Joined row before imputation; lookup misses stay missing here
struct MergedRow {
    driver: DriverId,
    team: Option<String>,
    qualifying_time_s: f64,
    /// Wet-scaled qualifying time; missing when a wet race meets a driver
    /// without a wet factor
    qualifying_adjusted: Option<f64>,
    wet_factor: Option<f64>,
    team_score: Option<f64>,
    season_average: Option<f64>,
    total_sector: Option<f64>,
}

/// Build the conditioned feature matrix
///
/// Conditioning order matters: wet scaling first, then the sector-time
/// mean-fill, then the winner flag and squaring, and only then the generic
/// zero-fill of whatever is still missing.
pub fn build_feature_table(
    estimates: &RaceEstimates,
    sectors: &SectorAggregator,
    weather: RaceWeather,
) -> FeatureTable {
    let scores = estimates.team_performance_scores();
    let wet_race = weather.rain_probability >= RAIN_THRESHOLD;

    let merged: Vec<MergedRow> = estimates
        .qualifying
        .iter()
        .map(|entry| {
            let wet_factor = estimates.wet_factor(&entry.driver);
            let qualifying_adjusted = if wet_race {
                wet_factor.map(|factor| entry.time_s * factor)
            } else {
                Some(entry.time_s)
            };
            let team = estimates.team_of(&entry.driver).map(str::to_string);
            let team_score = team.as_deref().and_then(|t| scores.get(t)).copied();

            MergedRow {
                driver: entry.driver.clone(),
                team,
                qualifying_time_s: entry.time_s,
                qualifying_adjusted,
                wet_factor,
                team_score,
                season_average: estimates.season_average(&entry.driver),
                total_sector: sectors.get(&entry.driver).map(|avg| avg.total()),
            }
        })
        .collect();

    // Mean of the totals present in the merged set, for imputation. When no
    // driver has sector data the gap falls through to the zero-fill.
    let present: Vec<f64> = merged.iter().filter_map(|row| row.total_sector).collect();
    let sector_mean = if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    };

    let rows = merged
        .into_iter()
        .map(|row| {
            let last_year_winner = u8::from(row.driver == estimates.last_year_winner);
            FeatureRow {
                qualifying_time_s: row.qualifying_time_s,
                qualifying_time_sq: row.qualifying_adjusted.map(|q| q * q).unwrap_or(0.0),
                wet_performance_factor: row.wet_factor.unwrap_or(0.0),
                team_performance_score: row.team_score.unwrap_or(0.0),
                season_average_s: row.season_average.unwrap_or(0.0),
                total_sector_time_s: row.total_sector.or(sector_mean).unwrap_or(0.0),
                rain_probability: weather.rain_probability,
                temperature_c: weather.temperature_c,
                last_year_winner,
                driver: row.driver,
                team: row.team,
            }
        })
        .collect();

    FeatureTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::estimates::QualifyingEstimate;
    use crate::LapRecord;
    use std::collections::HashMap;

    fn dry() -> RaceWeather {
        RaceWeather {
            rain_probability: 0.0,
            temperature_c: 24.0,
        }
    }

    fn rain(probability: f64) -> RaceWeather {
        RaceWeather {
            rain_probability: probability,
            temperature_c: 18.0,
        }
    }

    fn make_lap(driver: &str, s1: f64, s2: f64, s3: f64) -> LapRecord {
        LapRecord {
            driver: DriverId::new(driver),
            lap_time_s: s1 + s2 + s3,
            sector1_s: s1,
            sector2_s: s2,
            sector3_s: s3,
        }
    }

    /// Two-driver table with full lookups for A, nothing for B
    fn small_estimates() -> RaceEstimates {
        RaceEstimates {
            qualifying: vec![
                QualifyingEstimate {
                    driver: DriverId::new("AAA"),
                    time_s: 90.0,
                },
                QualifyingEstimate {
                    driver: DriverId::new("BBB"),
                    time_s: 92.0,
                },
            ],
            season_average_s: [(DriverId::new("AAA"), 91.0)].into_iter().collect(),
            wet_performance: [(DriverId::new("AAA"), 0.5)].into_iter().collect(),
            constructor_points: [("Alpha".to_string(), 10u32), ("Beta".to_string(), 0u32)]
                .into_iter()
                .collect(),
            driver_teams: [(DriverId::new("AAA"), "Alpha".to_string())]
                .into_iter()
                .collect(),
            last_year_winner: DriverId::new("AAA"),
        }
    }

    #[test]
    fn test_one_row_per_driver_in_table_order() {
        let table = build_feature_table(&small_estimates(), &SectorAggregator::new(), dry());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].driver, DriverId::new("AAA"));
        assert_eq!(table.rows[1].driver, DriverId::new("BBB"));

        let mut counts: HashMap<&DriverId, usize> = HashMap::new();
        for row in table.iter() {
            *counts.entry(&row.driver).or_default() += 1;
        }
        assert!(counts.values().all(|&n| n == 1));
    }

    #[test]
    fn test_dry_race_squares_unscaled_time() {
        let table = build_feature_table(&small_estimates(), &SectorAggregator::new(), dry());
        let a = table.get(&DriverId::new("AAA")).unwrap();
        assert_eq!(a.qualifying_time_s, 90.0);
        assert_eq!(a.qualifying_time_sq, 90.0 * 90.0);
    }

    #[test]
    fn test_wet_threshold_is_strict() {
        let estimates = small_estimates();
        let sectors = SectorAggregator::new();

        // 0.74 leaves the time unscaled
        let below = build_feature_table(&estimates, &sectors, rain(0.74));
        assert_eq!(
            below.get(&DriverId::new("AAA")).unwrap().qualifying_time_sq,
            90.0 * 90.0
        );

        // 0.75 scales by the wet factor
        let at = build_feature_table(&estimates, &sectors, rain(0.75));
        let scaled = 90.0 * 0.5;
        assert_eq!(
            at.get(&DriverId::new("AAA")).unwrap().qualifying_time_sq,
            scaled * scaled
        );
    }

    #[test]
    fn test_wet_race_without_factor_zero_fills_time() {
        // BBB has no wet factor: scaling a wet race leaves its qualifying
        // time missing, which the final zero-fill stamps to 0
        let table = build_feature_table(&small_estimates(), &SectorAggregator::new(), rain(0.9));
        let b = table.get(&DriverId::new("BBB")).unwrap();
        assert_eq!(b.qualifying_time_sq, 0.0);
        assert_eq!(b.wet_performance_factor, 0.0);
    }

    #[test]
    fn test_sector_imputation_uses_mean_not_zero() {
        let laps = vec![
            make_lap("AAA", 30.0, 30.0, 30.0), // total 90
        ];
        let sectors = SectorAggregator::from_laps(&laps);
        let table = build_feature_table(&small_estimates(), &sectors, dry());

        // BBB never set a lap: it gets AAA's mean, not zero
        let b = table.get(&DriverId::new("BBB")).unwrap();
        assert_eq!(b.total_sector_time_s, 90.0);
    }

    #[test]
    fn test_no_sector_data_at_all_zero_fills() {
        let table = build_feature_table(&small_estimates(), &SectorAggregator::new(), dry());
        assert!(table.iter().all(|row| row.total_sector_time_s == 0.0));
    }

    #[test]
    fn test_unmapped_lookups_zero_fill() {
        let table = build_feature_table(&small_estimates(), &SectorAggregator::new(), dry());
        let b = table.get(&DriverId::new("BBB")).unwrap();
        assert_eq!(b.team, None);
        assert_eq!(b.team_performance_score, 0.0);
        assert_eq!(b.season_average_s, 0.0);
        assert_eq!(b.wet_performance_factor, 0.0);
    }

    #[test]
    fn test_winner_flag() {
        let table = build_feature_table(&small_estimates(), &SectorAggregator::new(), dry());
        assert_eq!(table.get(&DriverId::new("AAA")).unwrap().last_year_winner, 1);
        assert_eq!(table.get(&DriverId::new("BBB")).unwrap().last_year_winner, 0);
    }

    #[test]
    fn test_weather_attached_to_every_row() {
        let table = build_feature_table(&small_estimates(), &SectorAggregator::new(), rain(0.3));
        for row in table.iter() {
            assert_eq!(row.rain_probability, 0.3);
            assert_eq!(row.temperature_c, 18.0);
        }
    }

    #[test]
    fn test_end_to_end_sixteen_drivers_thirteen_with_sectors() {
        let estimates = RaceEstimates::default();

        // Sector data for 13 of the 16; the Cadillac pair and ALB are new
        // and have no laps in the reference session
        let absent = ["ALB", "BOT", "PER"].map(DriverId::new);
        let mut laps = Vec::new();
        for (i, entry) in estimates
            .qualifying
            .iter()
            .filter(|e| !absent.contains(&e.driver))
            .enumerate()
        {
            let base = 29.0 + i as f64 * 0.1;
            laps.push(make_lap(entry.driver.as_str(), base, base + 6.0, base - 1.0));
        }
        assert_eq!(laps.len(), 13);

        let sectors = SectorAggregator::from_laps(&laps);
        let table = build_feature_table(&estimates, &sectors, dry());

        assert_eq!(table.len(), 16);

        // Dry: squared time is the unscaled estimate squared, for everyone
        for entry in &estimates.qualifying {
            let row = table.get(&entry.driver).unwrap();
            assert!((row.qualifying_time_sq - entry.time_s * entry.time_s).abs() < 1e-9);
        }

        // The three absentees share one imputed value, the mean of the 13
        let expected_mean = laps.iter().map(LapRecord::sector_total).sum::<f64>() / 13.0;
        for driver in &absent {
            let row = table.get(driver).unwrap();
            assert!((row.total_sector_time_s - expected_mean).abs() < 1e-9);
        }

        // And the present drivers keep their own totals
        let ver = table.get(&DriverId::new("VER")).unwrap();
        assert!((ver.total_sector_time_s - laps[0].sector_total()).abs() < 1e-9);
    }
}
