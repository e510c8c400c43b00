use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{record::RawRecord, value::parse_number};

/// Population mean and standard deviation of a column's valid values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

impl ColumnStats {
    pub fn new(mean: f64, std: f64) -> Self {
        ColumnStats { mean, std }
    }

    /// Stats over `values`; `{0, 0}` when there are none.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        ColumnStats {
            mean,
            std: variance.sqrt(),
        }
    }

    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Stats for every numeric-eligible column, keyed by column name in first-seen order.
pub type ColumnProfile = IndexMap<String, ColumnStats>;

/// Profiles the raw dataset before any cleaning.
///
/// A column is eligible once any row yields a finite number for it; columns
/// that never do are left out and pass through cleaning untouched.
#[instrument(skip(records), fields(rows = records.len()))]
pub fn profile(records: &[RawRecord]) -> ColumnProfile {
    let mut valid: IndexMap<String, Vec<f64>> = IndexMap::new();
    let mut seen: IndexSet<String> = IndexSet::new();

    for record in records {
        for (name, value) in &record.cells {
            if !seen.contains(name) {
                seen.insert(name.clone());
            }
            if let Some(n) = parse_number(value) {
                valid.entry(name.clone()).or_default().push(n);
            }
        }
    }

    // Keep column order as it appears in the data.
    let profile: ColumnProfile = seen
        .iter()
        .filter_map(|name| {
            valid
                .get(name)
                .map(|values| (name.clone(), ColumnStats::from_values(values)))
        })
        .collect();

    for (name, stats) in &profile {
        debug!(column = %name, mean = stats.mean, std = stats.std, "Profiled column");
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::value::CellValue;

    fn records(column: &str, values: Vec<CellValue>) -> Vec<RawRecord> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| RawRecord::new(format!("t{}", i)).with(column, v))
            .collect()
    }

    #[test]
    fn test_population_stats() {
        let stats = ColumnStats::from_values(&[10.0, 10.0, 10.0, 10.0, 100.0]);
        assert!((stats.mean - 28.0).abs() < 1e-12);
        assert!((stats.std - 36.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        assert_eq!(ColumnStats::from_values(&[]), ColumnStats::new(0.0, 0.0));
    }

    #[test]
    fn test_profile_uses_only_valid_values() {
        let data = records(
            "x",
            vec![
                CellValue::Number(2.0),
                CellValue::text("4"),
                CellValue::Missing,
                CellValue::text("junk"),
                CellValue::Number(f64::NAN),
            ],
        );
        let profile = profile(&data);
        let stats = profile.get("x").unwrap();
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.std, 1.0);
    }

    #[test]
    fn test_text_only_columns_excluded() {
        let data: Vec<RawRecord> = vec![
            RawRecord::new("t0").with("site", "north").with("v", 1.0),
            RawRecord::new("t1").with("site", "south").with("v", 2.0),
        ];
        let profile = profile(&data);
        assert!(profile.get("site").is_none());
        assert!(profile.get("v").is_some());
        assert!(profile.get("timestamp").is_none());
    }

    #[test]
    fn test_profile_column_order() {
        let data = vec![RawRecord::new("t0")
            .with("b", 1.0)
            .with("a", 2.0)
            .with("c", 3.0)];
        let stats = profile(&data);
        let names: Vec<&str> = stats.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
