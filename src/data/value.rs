use std::fmt;

use serde::{Deserialize, Serialize};

/// A single raw or cleaned cell.
///
/// Serializes untagged, so a record renders as plain JSON values: `null`,
/// a number, or a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Returns the number held by the cell without coercing text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Finite numeric value of the cell or `0.0`.
    pub fn finite_or_zero(&self) -> f64 {
        match self {
            CellValue::Number(n) if n.is_finite() => *n,
            _ => 0.0,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => write!(f, ""),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Coerces a cell to a finite number.
///
/// Numbers pass through when finite; text is trimmed and parsed. Absent,
/// empty, unparseable and non-finite values all yield `None`.
pub fn parse_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Missing => None,
        CellValue::Number(n) => n.is_finite().then_some(*n),
        CellValue::Text(s) => parse_str(s),
    }
}

/// Parses trimmed text into a finite number.
pub fn parse_str(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
