use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AugurError;

// Default header patterns. The CJK tokens cover localized exports.
static TIMESTAMP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)time|date|timestamp|时间|日期").expect("valid pattern"));
static PREDICTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)pred|prediction|预测").expect("valid pattern"));
static ACTUAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)actual|target|value|实际|真实|目标").expect("valid pattern")
});

/// Positional fallback for the prediction column.
const PREDICTION_FALLBACK_INDEX: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Timestamp,
    Prediction,
    Actual,
    Feature,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Timestamp => write!(f, "timestamp"),
            ColumnRole::Prediction => write!(f, "prediction"),
            ColumnRole::Actual => write!(f, "actual"),
            ColumnRole::Feature => write!(f, "feature"),
        }
    }
}

/// Header patterns used to recognise each role.
#[derive(Debug, Clone)]
pub struct RolePatterns {
    pub timestamp: Regex,
    pub prediction: Regex,
    pub actual: Regex,
}

impl Default for RolePatterns {
    fn default() -> Self {
        Self {
            timestamp: TIMESTAMP_PATTERN.clone(),
            prediction: PREDICTION_PATTERN.clone(),
            actual: ACTUAL_PATTERN.clone(),
        }
    }
}

impl RolePatterns {
    /// Builds patterns, replacing each default whose override is given.
    ///
    /// Overrides are matched case-insensitively.
    pub fn with_overrides(
        timestamp: Option<&str>,
        prediction: Option<&str>,
        actual: Option<&str>,
    ) -> Result<Self, AugurError> {
        let defaults = Self::default();
        Ok(Self {
            timestamp: compile_or(timestamp, defaults.timestamp)?,
            prediction: compile_or(prediction, defaults.prediction)?,
            actual: compile_or(actual, defaults.actual)?,
        })
    }
}

fn compile_or(pattern: Option<&str>, default: Regex) -> Result<Regex, AugurError> {
    match pattern {
        Some(p) => Ok(Regex::new(&format!("(?i){}", p))?),
        None => Ok(default),
    }
}

/// Header positions of the three recognised roles.
///
/// A missing timestamp means rows are stamped with the ingestion time; a
/// missing actual leaves the `actual` cell out of every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnRoles {
    pub timestamp: Option<usize>,
    pub prediction: Option<usize>,
    pub actual: Option<usize>,
}

impl ColumnRoles {
    /// Infers roles from header names.
    ///
    /// Roles are resolved in order timestamp, prediction, actual, each taking
    /// the first matching header not already claimed. Prediction falls back
    /// to index 1 when no header matches.
    pub fn infer(headers: &[String], patterns: &RolePatterns) -> Self {
        let find = |pattern: &Regex, claimed: &[Option<usize>]| {
            headers
                .iter()
                .enumerate()
                .find(|(i, h)| !claimed.contains(&Some(*i)) && pattern.is_match(h))
                .map(|(i, _)| i)
        };

        let timestamp = find(&patterns.timestamp, &[]);
        let prediction = find(&patterns.prediction, &[timestamp]).or_else(|| {
            (headers.len() > PREDICTION_FALLBACK_INDEX
                && timestamp != Some(PREDICTION_FALLBACK_INDEX))
                .then_some(PREDICTION_FALLBACK_INDEX)
        });
        let actual = find(&patterns.actual, &[timestamp, prediction]);

        let roles = Self {
            timestamp,
            prediction,
            actual,
        };
        if prediction.is_none() {
            warn!(?headers, "No prediction column found; every row will be dropped");
        }
        debug!(?headers, ?roles, "Inferred column roles");
        roles
    }

    pub fn role_of(&self, index: usize) -> ColumnRole {
        if self.timestamp == Some(index) {
            ColumnRole::Timestamp
        } else if self.prediction == Some(index) {
            ColumnRole::Prediction
        } else if self.actual == Some(index) {
            ColumnRole::Actual
        } else {
            ColumnRole::Feature
        }
    }
}
