use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    data::record::{column_names, CleanedRecord, ACTUAL, PREDICTION},
    util::math_utils::mean,
};

pub const DEFAULT_TOP_K: usize = 8;

/// Absolute correlation of one column with the target, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationWeight {
    pub name: String,
    pub weight: f64,
}

/// Pearson correlation over the first `min(xs.len(), ys.len())` elements.
///
/// Returns `0.0` for fewer than two points and for constant sequences.
pub fn correlate(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n <= 1 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    let denominator = if denominator == 0.0 { 1.0 } else { denominator };
    let r = sxy / denominator;
    if r.is_nan() {
        0.0
    } else {
        r.clamp(-1.0, 1.0)
    }
}

/// Columns ranked by default: everything except the timestamp, prediction and actual.
pub fn default_candidates(records: &[CleanedRecord]) -> Vec<String> {
    column_names(records.iter().map(|r| &r.cells))
        .into_iter()
        .filter(|name| name != PREDICTION && name != ACTUAL)
        .collect()
}

/// Ranks candidate columns by absolute correlation with `target`.
///
/// Non-finite or non-numeric values count as `0.0` here only. Returns at
/// most `top_k` weights, highest first; ties keep candidate order.
#[instrument(skip(records, candidates), fields(rows = records.len()))]
pub fn rank_influence(
    records: &[CleanedRecord],
    target: &str,
    candidates: Option<&[String]>,
    top_k: usize,
) -> Vec<CorrelationWeight> {
    let candidates = match candidates {
        Some(c) => c.to_vec(),
        None => default_candidates(records),
    };
    let targets: Vec<f64> = records
        .iter()
        .map(|r| r.numeric_or_zero(target))
        .collect();

    let mut weights: Vec<CorrelationWeight> = candidates
        .into_iter()
        .map(|name| {
            let values: Vec<f64> = records.iter().map(|r| r.numeric_or_zero(&name)).collect();
            let weight = correlate(&values, &targets).abs();
            CorrelationWeight {
                name,
                weight: if weight.is_nan() { 0.0 } else { weight },
            }
        })
        .collect();

    weights.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    weights.truncate(top_k);
    debug!(?weights, "Ranked influence");
    weights
}
