#![allow(dead_code)]

use augur::data::{
    record::{RawRecord, ACTUAL, PREDICTION},
    value::CellValue,
};

pub use augur::util::test_util::{setup_sample_data, setup_test_tracing};

pub fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// A record with numeric prediction and actual plus the given features.
pub fn numeric_record(
    timestamp: &str,
    prediction: f64,
    actual: f64,
    features: &[(&str, f64)],
) -> RawRecord {
    let mut record = RawRecord::new(timestamp)
        .with(PREDICTION, CellValue::Number(prediction))
        .with(ACTUAL, CellValue::Number(actual));
    for (name, value) in features {
        record = record.with(*name, CellValue::Number(*value));
    }
    record
}
