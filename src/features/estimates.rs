//! Hand-curated pace estimates
//!
//! Manually maintained per-driver and per-team figures for the weekend being
//! modelled. These are explicit structures passed into the pipeline so tests
//! and other weekends can substitute their own tables; the `Default` carries
//! the 2025 Jeddah estimates.

use crate::{DriverId, PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the qualifying estimate table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifyingEstimate {
    pub driver: DriverId,
    /// Estimated qualifying lap time in seconds
    pub time_s: f64,
}

/// The full set of hand-maintained estimates for one race weekend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceEstimates {
    /// Qualifying table; its row order is the output row order
    pub qualifying: Vec<QualifyingEstimate>,
    /// Season-average lap time per driver, seconds
    pub season_average_s: HashMap<DriverId, f64>,
    /// Wet-performance multiplier per driver
    pub wet_performance: HashMap<DriverId, f64>,
    /// Constructor championship points per team
    pub constructor_points: HashMap<String, u32>,
    /// Driver to team assignment
    pub driver_teams: HashMap<DriverId, String>,
    /// Winner of the previous edition of this race
    pub last_year_winner: DriverId,
}

impl RaceEstimates {
    /// Load estimates from a toml file, for alternate weekends
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PredictorError::Config(format!("Failed to read estimates file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| PredictorError::Config(format!("Failed to parse estimates: {}", e)))
    }

    /// Normalized constructor strength per team
    ///
    /// Points divided by the maximum across all teams: top team exactly 1.0,
    /// a zero-point team 0.0. With no points scored anywhere every team
    /// scores 0.0.
    pub fn team_performance_scores(&self) -> HashMap<String, f64> {
        let max_points = self.constructor_points.values().copied().max().unwrap_or(0);
        self.constructor_points
            .iter()
            .map(|(team, points)| {
                let score = if max_points == 0 {
                    0.0
                } else {
                    *points as f64 / max_points as f64
                };
                (team.clone(), score)
            })
            .collect()
    }

    pub fn team_of(&self, driver: &DriverId) -> Option<&str> {
        self.driver_teams.get(driver).map(String::as_str)
    }

    pub fn wet_factor(&self, driver: &DriverId) -> Option<f64> {
        self.wet_performance.get(driver).copied()
    }

    pub fn season_average(&self, driver: &DriverId) -> Option<f64> {
        self.season_average_s.get(driver).copied()
    }
}

fn driver_map(entries: &[(&str, f64)]) -> HashMap<DriverId, f64> {
    entries
        .iter()
        .map(|(code, value)| (DriverId::new(code), *value))
        .collect()
}

impl Default for RaceEstimates {
    /// 2025 Jeddah estimates, including the two Cadillac entries
    fn default() -> Self {
        let qualifying = [
            ("VER", 87.294),
            ("PIA", 87.304),
            ("LEC", 87.670),
            ("RUS", 87.407),
            ("HAM", 88.201),
            ("GAS", 88.367),
            ("ALO", 88.303),
            ("TSU", 88.204),
            ("SAI", 88.164),
            ("HUL", 88.782),
            ("OCO", 89.092),
            ("STR", 88.645),
            ("NOR", 87.489),
            ("ALB", 88.500),
            ("BOT", 88.900),
            ("PER", 88.600),
        ]
        .iter()
        .map(|(code, time_s)| QualifyingEstimate {
            driver: DriverId::new(code),
            time_s: *time_s,
        })
        .collect();

        let season_average_s = driver_map(&[
            ("VER", 88.0),
            ("PIA", 89.1),
            ("LEC", 89.2),
            ("RUS", 89.3),
            ("HAM", 89.4),
            ("GAS", 89.5),
            ("ALO", 89.6),
            ("TSU", 89.7),
            ("SAI", 89.8),
            ("HUL", 89.9),
            ("OCO", 90.0),
            ("STR", 90.1),
            ("NOR", 90.2),
            ("ALB", 90.3),
            ("BOT", 90.5),
            ("PER", 90.4),
        ]);

        let wet_performance = driver_map(&[
            ("VER", 0.975196),
            ("HAM", 0.976464),
            ("LEC", 0.975862),
            ("NOR", 0.978179),
            ("ALO", 0.972655),
            ("RUS", 0.968678),
            ("SAI", 0.978754),
            ("TSU", 0.996338),
            ("OCO", 0.981810),
            ("GAS", 0.978832),
            ("STR", 0.979857),
            ("PIA", 0.975000),
            ("HUL", 0.980000),
            ("ALB", 0.982000),
            ("BOT", 0.979000),
            ("PER", 0.978000),
        ]);

        let constructor_points = [
            ("McLaren", 78),
            ("Mercedes", 53),
            ("Red Bull", 36),
            ("Williams", 17),
            ("Ferrari", 17),
            ("Haas", 14),
            ("Aston Martin", 10),
            ("Kick Sauber", 6),
            ("Racing Bulls", 3),
            ("Alpine", 0),
            ("Cadillac", 0),
        ]
        .iter()
        .map(|(team, points)| (team.to_string(), *points))
        .collect();

        let driver_teams = [
            ("VER", "Red Bull"),
            ("NOR", "McLaren"),
            ("PIA", "McLaren"),
            ("LEC", "Ferrari"),
            ("RUS", "Mercedes"),
            ("HAM", "Mercedes"),
            ("GAS", "Alpine"),
            ("ALO", "Aston Martin"),
            ("TSU", "Racing Bulls"),
            ("SAI", "Ferrari"),
            ("HUL", "Kick Sauber"),
            ("OCO", "Alpine"),
            ("STR", "Aston Martin"),
            ("ALB", "Williams"),
            ("BOT", "Cadillac"),
            ("PER", "Cadillac"),
        ]
        .iter()
        .map(|(code, team)| (DriverId::new(code), team.to_string()))
        .collect();

        RaceEstimates {
            qualifying,
            season_average_s,
            wet_performance,
            constructor_points,
            driver_teams,
            last_year_winner: DriverId::new("VER"),
        }
    }
}
