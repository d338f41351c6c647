//! Sector time aggregation
//!
//! Per-driver mean sector times across a session.

use crate::{DriverId, LapRecord};
use serde::Serialize;
use std::collections::HashMap;

/// Mean sector times for one driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorAverages {
    pub sector1_s: f64,
    pub sector2_s: f64,
    pub sector3_s: f64,
    /// Number of complete laps behind the averages
    pub laps: usize,
}

impl SectorAverages {
    /// Total sector time, the headline pace feature
    pub fn total(&self) -> f64 {
        self.sector1_s + self.sector2_s + self.sector3_s
    }
}

#[derive(Debug, Clone, Default)]
struct SectorSums {
    sector1: f64,
    sector2: f64,
    sector3: f64,
    laps: usize,
}

/// Accumulates complete laps and produces per-driver sector averages
///
/// Drivers without a single complete lap are simply absent here; the merge
/// stage imputes them later.
pub struct SectorAggregator {
    sums: HashMap<DriverId, SectorSums>,
}

impl SectorAggregator {
    pub fn new() -> Self {
        SectorAggregator {
            sums: HashMap::new(),
        }
    }

    /// Build an aggregator from a full session of laps
    pub fn from_laps(laps: &[LapRecord]) -> Self {
        let mut aggregator = Self::new();
        for lap in laps {
            aggregator.add_lap(lap);
        }
        aggregator
    }

    pub fn add_lap(&mut self, lap: &LapRecord) {
        let entry = self.sums.entry(lap.driver.clone()).or_default();
        entry.sector1 += lap.sector1_s;
        entry.sector2 += lap.sector2_s;
        entry.sector3 += lap.sector3_s;
        entry.laps += 1;
    }

    /// Averages for one driver, if they completed any laps
    pub fn get(&self, driver: &DriverId) -> Option<SectorAverages> {
        self.sums.get(driver).map(|sums| {
            let n = sums.laps as f64;
            SectorAverages {
                sector1_s: sums.sector1 / n,
                sector2_s: sums.sector2 / n,
                sector3_s: sums.sector3 / n,
                laps: sums.laps,
            }
        })
    }

    /// Averages for every driver with at least one complete lap
    pub fn averages(&self) -> HashMap<DriverId, SectorAverages> {
        self.sums
            .keys()
            .map(|driver| (driver.clone(), self.get(driver).unwrap()))
            .collect()
    }

    /// Number of drivers with at least one complete lap
    pub fn driver_count(&self) -> usize {
        self.sums.len()
    }

    /// Total complete laps accumulated
    pub fn lap_count(&self) -> usize {
        self.sums.values().map(|s| s.laps).sum()
    }
}

impl Default for SectorAggregator {
    fn default() -> Self {
        Self::new()
    }
}
