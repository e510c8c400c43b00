use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::CellValue;

pub const TIMESTAMP: &str = "timestamp";
pub const PREDICTION: &str = "prediction";
pub const ACTUAL: &str = "actual";

/// One input row: a timestamp plus named cells in header order.
///
/// When the prediction and actual roles resolve they are stored under the
/// canonical `prediction` and `actual` keys; feature columns keep their
/// header names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub timestamp: String,
    #[serde(flatten)]
    pub cells: IndexMap<String, CellValue>,
}

impl RawRecord {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            cells: IndexMap::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

/// A record after cleaning.
///
/// `row` is the index of the raw input row it was produced from, so audit
/// log keys keep pointing at the right record after rows are dropped or
/// reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub row: usize,
    pub timestamp: String,
    #[serde(flatten)]
    pub cells: IndexMap<String, CellValue>,
}

impl CleanedRecord {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn prediction(&self) -> Option<&CellValue> {
        self.cells.get(PREDICTION)
    }

    pub fn actual(&self) -> Option<&CellValue> {
        self.cells.get(ACTUAL)
    }

    /// Value of `column` for numeric work, with anything non-finite read as `0.0`.
    pub fn numeric_or_zero(&self, column: &str) -> f64 {
        self.cells
            .get(column)
            .map(CellValue::finite_or_zero)
            .unwrap_or(0.0)
    }
}

/// Column names across `records`, in order of first appearance.
pub fn column_names<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a IndexMap<String, CellValue>>,
{
    let mut names: Vec<String> = Vec::new();
    for cells in records {
        for name in cells.keys() {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_column_order() {
        let record = RawRecord::new("2024-01-01T00:00:00Z")
            .with(PREDICTION, 1.0)
            .with("zeta", "a")
            .with("alpha", 2.0);
        let keys: Vec<&str> = record.cells.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![PREDICTION, "zeta", "alpha"]);
    }

    #[test]
    fn test_column_names_union() {
        let a = RawRecord::new("t1").with(PREDICTION, 1.0).with("x", 1.0);
        let b = RawRecord::new("t2").with(PREDICTION, 2.0).with("y", 1.0);
        let names = column_names([&a.cells, &b.cells]);
        assert_eq!(names, vec![PREDICTION, "x", "y"]);
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = CleanedRecord {
            row: 3,
            timestamp: "t".to_string(),
            cells: IndexMap::from([(PREDICTION.to_string(), CellValue::Number(2.0))]),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["row"], 3);
        assert_eq!(json["timestamp"], "t");
        assert_eq!(json["prediction"], 2.0);
    }

    #[test]
    fn test_numeric_or_zero() {
        let record = CleanedRecord {
            row: 0,
            timestamp: "t".to_string(),
            cells: IndexMap::from([
                ("a".to_string(), CellValue::Number(f64::NAN)),
                ("b".to_string(), CellValue::text("x")),
                ("c".to_string(), CellValue::Number(4.0)),
            ]),
        };
        assert_eq!(record.numeric_or_zero("a"), 0.0);
        assert_eq!(record.numeric_or_zero("b"), 0.0);
        assert_eq!(record.numeric_or_zero("c"), 4.0);
        assert_eq!(record.numeric_or_zero("missing"), 0.0);
    }
}
