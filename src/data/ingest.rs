use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};

use super::{
    record::{RawRecord, ACTUAL, PREDICTION},
    roles::{ColumnRole, ColumnRoles, RolePatterns},
    value::{parse_number, parse_str, CellValue},
};
use crate::error::AugurError;

/// Turns delimited text or pre-split rows into [`RawRecord`]s.
#[derive(Debug, Clone)]
pub struct Ingestor {
    patterns: RolePatterns,
    delimiter: u8,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self {
            patterns: RolePatterns::default(),
            delimiter: b',',
        }
    }
}

impl Ingestor {
    pub fn new(patterns: RolePatterns, delimiter: u8) -> Self {
        Self {
            patterns,
            delimiter,
        }
    }

    /// Reads and ingests a delimited text file.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn ingest_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RawRecord>, AugurError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AugurError::InputReadError {
            path: path.to_path_buf(),
            source,
        })?;
        info!(bytes = text.len(), "Read input file");
        self.ingest_text(&text)
    }

    /// Ingests delimited text, stamping rows without a timestamp column with
    /// the current time.
    pub fn ingest_text(&self, text: &str) -> Result<Vec<RawRecord>, AugurError> {
        self.ingest_text_at(text, Utc::now())
    }

    /// Ingests delimited text with an explicit ingestion time.
    ///
    /// Blank lines are dropped and the first remaining line is the header.
    /// Input without at least one data line yields no records.
    #[instrument(skip(self, text, now), fields(delimiter = %(self.delimiter as char)))]
    pub fn ingest_text_at(
        &self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RawRecord>, AugurError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() < 2 {
            debug!(lines = lines.len(), "No data lines in input");
            return Ok(Vec::new());
        }

        let mut rows = Vec::with_capacity(lines.len());
        for line in &lines {
            rows.push(self.split_line(line)?);
        }

        let mut rows = rows.into_iter();
        let headers = match rows.next() {
            Some(headers) => headers,
            None => return Ok(Vec::new()),
        };
        let rows: Vec<Vec<CellValue>> = rows
            .map(|cells| cells.into_iter().map(CellValue::Text).collect())
            .collect();

        Ok(self.map_rows(&headers, rows, now, TextTyping::Parse))
    }

    /// Splits one line into trimmed cells.
    ///
    /// Each line gets its own reader, so an unterminated quote ends at the
    /// line break instead of swallowing the rows after it.
    fn split_line(&self, line: &str) -> Result<Vec<String>, AugurError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(line.as_bytes());
        match reader.records().next() {
            Some(record) => Ok(record?.iter().map(|s| s.trim().to_string()).collect()),
            None => Ok(Vec::new()),
        }
    }

    /// Maps caller-supplied rows onto records using the header roles.
    ///
    /// Cells are taken as given; typing of prediction and actual values is
    /// left to the cleaning pass.
    pub fn ingest_rows(
        &self,
        headers: &[String],
        rows: Vec<Vec<CellValue>>,
        now: DateTime<Utc>,
    ) -> Vec<RawRecord> {
        self.map_rows(headers, rows, now, TextTyping::Keep)
    }

    /// Already-structured records pass through unchanged.
    pub fn ingest_records(&self, records: Vec<RawRecord>) -> Vec<RawRecord> {
        records
    }

    fn map_rows(
        &self,
        headers: &[String],
        rows: Vec<Vec<CellValue>>,
        now: DateTime<Utc>,
        typing: TextTyping,
    ) -> Vec<RawRecord> {
        let roles = ColumnRoles::infer(headers, &self.patterns);
        if roles.timestamp.is_none() {
            warn!("No timestamp column found; stamping rows with ingestion time");
        }
        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        let records: Vec<RawRecord> = rows
            .into_iter()
            .map(|mut cells| {
                // Short rows surface their trailing cells as missing.
                cells.resize(headers.len(), CellValue::Missing);
                self.map_row(headers, &roles, cells, &stamp, typing)
            })
            .collect();

        info!(
            rows = records.len(),
            columns = headers.len(),
            "Ingested records"
        );
        records
    }

    fn map_row(
        &self,
        headers: &[String],
        roles: &ColumnRoles,
        cells: Vec<CellValue>,
        stamp: &str,
        typing: TextTyping,
    ) -> RawRecord {
        let mut timestamp = None;
        let mut prediction = CellValue::Missing;
        let mut actual = None;
        let mut features = IndexMap::new();

        for (index, cell) in cells.into_iter().enumerate() {
            match roles.role_of(index) {
                ColumnRole::Timestamp => timestamp = Some(cell.to_string()),
                ColumnRole::Prediction => prediction = typing.measure(cell),
                ColumnRole::Actual => actual = Some(typing.measure(cell)),
                ColumnRole::Feature => {
                    if let Some(name) = headers.get(index) {
                        features.insert(name.clone(), typing.feature(cell));
                    }
                }
            }
        }

        let mut record_cells = IndexMap::with_capacity(features.len() + 2);
        if roles.prediction.is_some() {
            record_cells.insert(PREDICTION.to_string(), prediction);
        }
        if let Some(actual) = actual {
            record_cells.insert(ACTUAL.to_string(), actual);
        }
        record_cells.extend(features);

        RawRecord {
            timestamp: timestamp.unwrap_or_else(|| stamp.to_string()),
            cells: record_cells,
        }
    }
}

/// How text cells are typed during row mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTyping {
    /// Delimited text: numeric-looking cells become numbers, blanks become
    /// missing and anything else stays text for the cleaning pass to judge.
    Parse,
    /// Caller-typed rows: everything kept verbatim.
    Keep,
}

impl TextTyping {
    fn measure(self, cell: CellValue) -> CellValue {
        match self {
            TextTyping::Parse => match parse_number(&cell) {
                Some(n) => CellValue::Number(n),
                None => match cell {
                    CellValue::Text(s) if !s.is_empty() => CellValue::Text(s),
                    _ => CellValue::Missing,
                },
            },
            TextTyping::Keep => cell,
        }
    }

    fn feature(self, cell: CellValue) -> CellValue {
        match (self, cell) {
            (TextTyping::Parse, CellValue::Text(s)) if s.is_empty() => CellValue::Missing,
            (TextTyping::Parse, CellValue::Text(s)) => match parse_str(&s) {
                Some(n) => CellValue::Number(n),
                None => CellValue::Text(s),
            },
            (_, cell) => cell,
        }
    }
}
