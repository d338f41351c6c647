//! Feature engineering
//!
//! Converts session telemetry and hand-curated estimates into the
//! model-ready feature matrix.

pub mod estimates;
pub mod matrix;
pub mod sectors;

pub use estimates::RaceEstimates;
pub use matrix::{build_feature_table, FeatureRow, FeatureTable};
pub use sectors::SectorAggregator;
