//! Console projection of the feature table
//!
//! The printed projection (driver, team, wet factor, transformed qualifying
//! time) is the run's only persisted artifact.

use crate::features::{FeatureRow, FeatureTable};

fn team_label(row: &FeatureRow) -> &str {
    row.team.as_deref().unwrap_or("-")
}

/// Fixed-width table, the default output
pub fn format_table(table: &FeatureTable) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<8} {:<14} {:>10} {:>16}\n",
        "Driver", "Team", "WetFactor", "QualifyingTime"
    ));
    out.push_str(&format!("{}\n", "-".repeat(52)));
    for row in table.iter() {
        out.push_str(&format!(
            "{:<8} {:<14} {:>10.6} {:>16.3}\n",
            row.driver.as_str(),
            team_label(row),
            row.wet_performance_factor,
            row.qualifying_time_sq,
        ));
    }
    out
}

/// Full feature rows as pretty JSON
pub fn format_json(table: &FeatureTable) -> String {
    serde_json::to_string_pretty(&table.rows).unwrap_or_else(|_| "[]".to_string())
}

/// The projection as CSV
pub fn format_csv(table: &FeatureTable) -> String {
    let mut out = String::from("driver,team,wet_performance_factor,qualifying_time_sq\n");
    for row in table.iter() {
        out.push_str(&format!(
            "{},{},{:.6},{:.3}\n",
            row.driver.as_str(),
            team_label(row),
            row.wet_performance_factor,
            row.qualifying_time_sq,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{build_feature_table, RaceEstimates, SectorAggregator};
    use crate::RaceWeather;

    fn sample_table() -> FeatureTable {
        build_feature_table(
            &RaceEstimates::default(),
            &SectorAggregator::new(),
            RaceWeather::default(),
        )
    }

    #[test]
    fn test_table_has_header_and_one_line_per_driver() {
        let text = format_table(&sample_table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2 + 16);
        assert!(lines[0].contains("Driver"));
        assert!(lines[2].starts_with("VER"));
        assert!(lines[2].contains("Red Bull"));
    }

    #[test]
    fn test_csv_shape() {
        let text = format_csv(&sample_table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 16);
        assert_eq!(
            lines[0],
            "driver,team,wet_performance_factor,qualifying_time_sq"
        );
        assert!(lines[1].starts_with("VER,Red Bull,"));
    }

    #[test]
    fn test_json_is_parseable() {
        let text = format_json(&sample_table());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 16);
        assert_eq!(value[0]["driver"], "VER");
    }
}
