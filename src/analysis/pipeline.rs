use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{
    correlation::{rank_influence, CorrelationWeight, DEFAULT_TOP_K},
    summary::{summarize, DatasetSummary},
};
use crate::{
    config::AugurConfig,
    data::{
        clean::{AuditLog, Cleaner, CleaningSummary},
        ingest::Ingestor,
        order::finalize,
        profile::profile,
        record::{CleanedRecord, RawRecord, PREDICTION},
    },
    error::AugurError,
};

/// Everything the rendering layer consumes from one run.
///
/// `records` is the cleaned and ordered dataset; `events` annotates it by raw
/// row index and column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub records: Vec<CleanedRecord>,
    pub events: AuditLog,
    pub cleaning: CleaningSummary,
    pub influence: Vec<CorrelationWeight>,
    pub summary: DatasetSummary,
}

/// ingest → profile → clean → finalize → rank/summarize.
#[derive(Debug, Clone)]
pub struct Pipeline {
    ingestor: Ingestor,
    cleaner: Cleaner,
    candidates: Option<Vec<String>>,
    top_k: usize,
}

impl Pipeline {
    pub fn new(
        ingestor: Ingestor,
        cleaner: Cleaner,
        candidates: Option<Vec<String>>,
        top_k: usize,
    ) -> Self {
        Self {
            ingestor,
            cleaner,
            candidates,
            top_k,
        }
    }

    pub fn from_config(config: &AugurConfig) -> Result<Self, AugurError> {
        config.validate()?;
        Ok(Self::new(
            config.ingestor()?,
            Cleaner::new(config.cleaning_options()?),
            config.candidate_columns.clone(),
            config.top_k,
        ))
    }

    /// Restricts the influence ranking to `candidates`.
    pub fn with_candidates(mut self, candidates: Option<Vec<String>>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    pub fn run_text(&self, text: &str) -> Result<Report, AugurError> {
        let records = self.ingestor.ingest_text(text)?;
        Ok(self.run_records(records))
    }

    #[instrument(skip(self, records), fields(rows = records.len()))]
    pub fn run_records(&self, records: Vec<RawRecord>) -> Report {
        let records = self.ingestor.ingest_records(records);
        let stats = profile(&records);
        let outcome = self.cleaner.clean(&records, &stats);
        let finalized = finalize(outcome.cleaned);

        let influence = rank_influence(
            &finalized,
            PREDICTION,
            self.candidates.as_deref(),
            self.top_k,
        );
        let summary = summarize(&finalized);

        info!(
            kept = finalized.len(),
            events = outcome.events.len(),
            ranked = influence.len(),
            "Pipeline complete"
        );
        Report {
            records: finalized,
            events: outcome.events,
            cleaning: outcome.summary,
            influence,
            summary,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Ingestor::default(), Cleaner::default(), None, DEFAULT_TOP_K)
    }
}
