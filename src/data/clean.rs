use std::fmt;

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{
    profile::{ColumnProfile, ColumnStats},
    record::{CleanedRecord, RawRecord},
    value::{parse_number, CellValue},
};

pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Missing,
    Abnormal,
    Type,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Missing => write!(f, "missing"),
            EventKind::Abnormal => write!(f, "abnormal"),
            EventKind::Type => write!(f, "type"),
        }
    }
}

/// One automatic repair applied to one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub row: usize,
    pub column: String,
    pub original: CellValue,
    pub processed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningSummary {
    pub missing: usize,
    pub abnormal: usize,
    pub type_converted: usize,
}

impl CleaningSummary {
    pub fn total(&self) -> usize {
        self.missing + self.abnormal + self.type_converted
    }

    fn record(&mut self, kind: EventKind) {
        match kind {
            EventKind::Missing => self.missing += 1,
            EventKind::Abnormal => self.abnormal += 1,
            EventKind::Type => self.type_converted += 1,
        }
    }
}

/// Every cleaning event of a dataset, keyed by `"{row}-{column}"`.
///
/// Iterates in the order events were recorded (row-major).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    events: IndexMap<String, CleaningEvent>,
}

impl AuditLog {
    pub fn key(row: usize, column: &str) -> String {
        format!("{}-{}", row, column)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&CleaningEvent> {
        self.events.get(&Self::key(row, column))
    }

    pub fn get_key(&self, key: &str) -> Option<&CleaningEvent> {
        self.events.get(key)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CleaningEvent)> {
        self.events.iter()
    }

    pub fn events(&self) -> impl Iterator<Item = &CleaningEvent> {
        self.events.values()
    }

    pub fn summary(&self) -> CleaningSummary {
        let mut summary = CleaningSummary::default();
        for event in self.events.values() {
            summary.record(event.kind);
        }
        summary
    }

    fn insert(&mut self, event: CleaningEvent) {
        self.events
            .insert(Self::key(event.row, &event.column), event);
    }
}

/// Cleaned records with the audit log that annotates them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CleaningOutcome {
    pub cleaned: Vec<CleanedRecord>,
    pub events: AuditLog,
    pub summary: CleaningSummary,
}

#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct CleaningOptions {
    /// Z-score beyond which a value is capped.
    #[builder(default = "DEFAULT_OUTLIER_THRESHOLD")]
    pub outlier_threshold: f64,
}

impl CleaningOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.outlier_threshold {
            Some(t) if !(t.is_finite() && t > 0.0) => Err(format!(
                "outlier threshold must be a positive finite number, got {}",
                t
            )),
            _ => Ok(()),
        }
    }
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

/// Per-cell repair of a raw dataset.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    options: CleaningOptions,
}

impl Cleaner {
    pub fn new(options: CleaningOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CleaningOptions {
        &self.options
    }

    /// Cleans every numeric-eligible cell of every row.
    ///
    /// Columns absent from `profile` are copied through unchanged.
    #[instrument(
        skip(self, records, profile),
        fields(rows = records.len(), columns = profile.len())
    )]
    pub fn clean(&self, records: &[RawRecord], profile: &ColumnProfile) -> CleaningOutcome {
        let mut events = AuditLog::default();
        let mut summary = CleaningSummary::default();

        let cleaned = records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let mut cells = IndexMap::with_capacity(record.cells.len());
                for (column, value) in &record.cells {
                    let processed = match profile.get(column) {
                        Some(stats) => match self.repair(value, stats) {
                            Some((kind, processed)) => {
                                summary.record(kind);
                                events.insert(CleaningEvent {
                                    kind,
                                    row,
                                    column: column.clone(),
                                    original: value.clone(),
                                    processed,
                                });
                                CellValue::Number(processed)
                            }
                            None => value.clone(),
                        },
                        None => value.clone(),
                    };
                    cells.insert(column.clone(), processed);
                }
                CleanedRecord {
                    row,
                    timestamp: record.timestamp.clone(),
                    cells,
                }
            })
            .collect();

        info!(
            missing = summary.missing,
            abnormal = summary.abnormal,
            type_converted = summary.type_converted,
            "Cleaned dataset"
        );
        CleaningOutcome {
            cleaned,
            events,
            summary,
        }
    }

    /// Chooses the single repair for a cell, if any.
    ///
    /// Branches are tried in order missing, type, abnormal; the first match wins.
    pub fn repair(&self, value: &CellValue, stats: &ColumnStats) -> Option<(EventKind, f64)> {
        let parsed = match parse_number(value) {
            Some(n) => n,
            None => return Some((EventKind::Missing, stats.mean)),
        };

        if let CellValue::Text(_) = value {
            return Some((EventKind::Type, parsed));
        }

        if stats.std > 0.0 && stats.z_score(parsed).abs() > self.options.outlier_threshold {
            let capped = stats.mean
                + (parsed - stats.mean).signum() * self.options.outlier_threshold * stats.std;
            // A value already sitting on the cap is left alone.
            if parsed != capped {
                debug!(value = parsed, capped, "Capping outlier");
                return Some((EventKind::Abnormal, capped));
            }
        }

        None
    }
}
