use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, instrument, warn};

use super::{record::CleanedRecord, value::CellValue};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a timestamp as RFC 3339, a naive date-time (read as UTC), a bare
/// date, or integer epoch milliseconds.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

fn is_finite_number(value: &CellValue) -> bool {
    matches!(value, CellValue::Number(n) if n.is_finite())
}

/// Keeps records with a finite prediction and, when present, a finite actual.
pub fn is_usable(record: &CleanedRecord) -> bool {
    let prediction_ok = record.prediction().is_some_and(is_finite_number);
    let actual_ok = record.actual().map_or(true, is_finite_number);
    prediction_ok && actual_ok
}

/// Drops unusable records and sorts the rest chronologically.
///
/// The sort is stable, so equal timestamps keep input order. Timestamps that
/// do not parse sort after every parseable one.
#[instrument(skip(cleaned), fields(rows = cleaned.len()))]
pub fn finalize(cleaned: Vec<CleanedRecord>) -> Vec<CleanedRecord> {
    let total = cleaned.len();
    let mut keyed: Vec<(Option<DateTime<Utc>>, CleanedRecord)> = cleaned
        .into_iter()
        .filter(is_usable)
        .map(|record| (parse_timestamp(&record.timestamp), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let finalized: Vec<CleanedRecord> = keyed.into_iter().map(|(_, record)| record).collect();
    if finalized.len() < total {
        warn!(
            dropped = total - finalized.len(),
            "Dropped rows without a usable prediction or actual"
        );
    }
    debug!(
        kept = finalized.len(),
        dropped = total - finalized.len(),
        "Finalized dataset"
    );
    finalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{ACTUAL, PREDICTION};
    use chrono::TimeZone;
    use indexmap::IndexMap;

    fn record(
        row: usize,
        timestamp: &str,
        prediction: CellValue,
        actual: Option<CellValue>,
    ) -> CleanedRecord {
        let mut cells = IndexMap::new();
        cells.insert(PREDICTION.to_string(), prediction);
        if let Some(actual) = actual {
            cells.insert(ACTUAL.to_string(), actual);
        }
        CleanedRecord {
            row,
            timestamp: timestamp.to_string(),
            cells,
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 6, 7, 8).unwrap();
        assert_eq!(parse_timestamp("2024-03-05T06:07:08Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T08:07:08+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 06:07:08"), Some(expected));
        assert_eq!(parse_timestamp("2024/03/05 06:07:08"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-05"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp(&expected.timestamp_millis().to_string()),
            Some(expected)
        );
        assert_eq!(parse_timestamp("t1"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_drops_unusable_records() {
        let records = vec![
            record(0, "2024-01-01", CellValue::Number(1.0), None),
            record(1, "2024-01-02", CellValue::Number(f64::NAN), None),
            record(2, "2024-01-03", CellValue::text("x"), None),
            record(3, "2024-01-04", CellValue::Number(1.0), Some(CellValue::Number(f64::INFINITY))),
            record(4, "2024-01-05", CellValue::Number(1.0), Some(CellValue::Number(2.0))),
        ];
        let rows: Vec<usize> = finalize(records).iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 4]);
    }

    #[test]
    fn test_sorted_chronologically_and_stable() {
        let records = vec![
            record(0, "2024-01-03", CellValue::Number(1.0), None),
            record(1, "2024-01-01", CellValue::Number(2.0), None),
            record(2, "garbage", CellValue::Number(3.0), None),
            record(3, "2024-01-01T00:00:00Z", CellValue::Number(4.0), None),
            record(4, "2024-01-02", CellValue::Number(5.0), None),
        ];
        let rows: Vec<usize> = finalize(records).iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_unparseable_timestamps_keep_input_order() {
        let records = vec![
            record(0, "t2", CellValue::Number(1.0), None),
            record(1, "t1", CellValue::Number(2.0), None),
        ];
        let rows: Vec<usize> = finalize(records).iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 1]);
    }

    #[test]
    fn test_empty() {
        assert!(finalize(Vec::new()).is_empty());
    }
}
