use serde::{Deserialize, Serialize};

use super::correlation::correlate;
use crate::{
    data::{record::CleanedRecord, value::CellValue},
    util::math_utils::mean,
};

/// Headline statistics of the finalized dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub mean_prediction: f64,
    pub mean_actual: f64,
    pub prediction_actual_correlation: f64,
}

/// Summarizes predictions against actuals.
///
/// A record without an actual contributes its prediction in that place.
pub fn summarize(records: &[CleanedRecord]) -> DatasetSummary {
    if records.is_empty() {
        return DatasetSummary::default();
    }

    let (predictions, actuals): (Vec<f64>, Vec<f64>) = records
        .iter()
        .map(|record| {
            let prediction = record
                .prediction()
                .map(CellValue::finite_or_zero)
                .unwrap_or(0.0);
            let actual = record
                .actual()
                .map(CellValue::finite_or_zero)
                .unwrap_or(prediction);
            (prediction, actual)
        })
        .unzip();

    DatasetSummary {
        mean_prediction: mean(&predictions),
        mean_actual: mean(&actuals),
        prediction_actual_correlation: correlate(&predictions, &actuals),
    }
}
