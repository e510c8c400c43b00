use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AugurError {
    #[error("Failed to read input file {path}: {source}")]
    InputReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Serde YAML Error: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Serde JSON Error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Invalid column pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Configuration Error: {0}")]
    ConfigError(String),
    #[error("Failed to build options: {0}")]
    BuilderError(String),
}
