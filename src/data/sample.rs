use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use super::{
    record::{RawRecord, ACTUAL, PREDICTION},
    value::CellValue,
};

const DEFAULT_START: (i32, u32, u32) = (2024, 1, 1);

/// Generates a synthetic prediction/actual dataset with hourly timestamps.
///
/// The output carries the imperfections the cleaning pass is meant to repair:
/// blank cells, numbers stored as text, and the occasional spike.
/// `load` tracks the prediction closely, `temperature` loosely and `noise`
/// not at all. The same seed always yields the same records.
pub fn generate_sample(rows: usize, seed: u64) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start: DateTime<Utc> = Utc
        .with_ymd_and_hms(DEFAULT_START.0, DEFAULT_START.1, DEFAULT_START.2, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    let records: Vec<RawRecord> = (0..rows)
        .map(|i| {
            let timestamp = (start + Duration::hours(i as i64))
                .to_rfc3339_opts(SecondsFormat::Secs, true);
            let phase = i as f64 / 12.0;
            let prediction = 100.0 + 20.0 * phase.sin() + rng.gen_range(-2.0..2.0);
            let actual = prediction + rng.gen_range(-5.0..5.0);
            let load = prediction * 0.8 + rng.gen_range(-1.0..1.0);
            let temperature = 15.0 + 5.0 * phase.sin() + rng.gen_range(-4.0..4.0);
            let noise = rng.gen_range(0.0..50.0);

            let prediction = match rng.gen_range(0..40) {
                0 => CellValue::Missing,
                1 => CellValue::Text(format!("{:.2}", prediction)),
                _ => CellValue::Number(prediction),
            };
            let actual = match rng.gen_range(0..40) {
                0 => CellValue::text(""),
                1 => CellValue::Number(actual * 10.0),
                _ => CellValue::Number(actual),
            };

            RawRecord::new(timestamp)
                .with(PREDICTION, prediction)
                .with(ACTUAL, actual)
                .with("load", load)
                .with("temperature", temperature)
                .with("noise", noise)
        })
        .collect();

    info!(rows = records.len(), seed, "Generated sample dataset");
    records
}
