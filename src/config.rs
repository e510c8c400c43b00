use std::{
    fs::{self, File},
    io::{BufReader, Write as _},
    path::Path,
};

use serde::{Deserialize, Serialize};
use serde_yaml::from_reader;
use tracing::{debug, info, instrument};

use crate::{
    analysis::correlation::DEFAULT_TOP_K,
    data::{
        clean::{CleaningOptions, CleaningOptionsBuilder, DEFAULT_OUTLIER_THRESHOLD},
        ingest::Ingestor,
        roles::RolePatterns,
    },
    error::AugurError,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct AugurConfig {
    pub outlier_threshold: f64,
    pub top_k: usize,
    pub delimiter: String,
    pub timestamp_pattern: Option<String>,
    pub prediction_pattern: Option<String>,
    pub actual_pattern: Option<String>,
    pub candidate_columns: Option<Vec<String>>,
    pub log_dir: Option<String>,
}

const DEFAULT_DATA: &str = r#"
outlier-threshold: 3.0
top-k: 8
delimiter: ","
"#;

impl Default for AugurConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            delimiter: ",".to_string(),
            timestamp_pattern: None,
            prediction_pattern: None,
            actual_pattern: None,
            candidate_columns: None,
            log_dir: None,
        }
    }
}

impl AugurConfig {
    /// Reads the configuration from a YAML file.
    ///
    /// If the file does not exist, it creates a default configuration file.
    ///
    /// # Arguments
    ///
    /// * `filename` - Optional path to the configuration file.
    ///
    /// # Returns
    ///
    /// A `Result` containing the validated `AugurConfig` on success or an `AugurError` on failure.
    #[instrument(level = "info", skip(filename))]
    pub fn read_config<P: AsRef<Path>>(filename: Option<P>) -> Result<Self, AugurError> {
        let path = filename
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(|| Path::new("augur.yml").to_path_buf());

        info!(path = %path.display(), "Reading configuration");

        if !path.exists() {
            info!(
                "Config file does not exist. Creating default config at {}",
                path.display()
            );
            let mut file = File::create(&path)?;
            file.write_all(DEFAULT_DATA.as_bytes())?;
            debug!("Default configuration file created");
            return Ok(AugurConfig::default());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let config: Self = from_reader(reader)?;
        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Log directory named by the file at `filename`, read without validation.
    ///
    /// Lets tracing be installed before [`AugurConfig::read_config`] runs. A
    /// missing or malformed file yields `None`.
    pub fn log_dir_hint<P: AsRef<Path>>(filename: P) -> Option<String> {
        let text = fs::read_to_string(filename).ok()?;
        serde_yaml::from_str::<Self>(&text).ok()?.log_dir
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), AugurError> {
        self.cleaning_options()?;
        self.delimiter_byte()?;
        self.role_patterns()?;
        if self.top_k == 0 {
            return Err(AugurError::ConfigError(
                "top-k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The delimiter as a single ASCII byte.
    pub fn delimiter_byte(&self) -> Result<u8, AugurError> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(AugurError::ConfigError(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }

    pub fn role_patterns(&self) -> Result<RolePatterns, AugurError> {
        RolePatterns::with_overrides(
            self.timestamp_pattern.as_deref(),
            self.prediction_pattern.as_deref(),
            self.actual_pattern.as_deref(),
        )
    }

    pub fn cleaning_options(&self) -> Result<CleaningOptions, AugurError> {
        CleaningOptionsBuilder::default()
            .outlier_threshold(self.outlier_threshold)
            .build()
            .map_err(|e| AugurError::BuilderError(e.to_string()))
    }

    pub fn ingestor(&self) -> Result<Ingestor, AugurError> {
        Ok(Ingestor::new(self.role_patterns()?, self.delimiter_byte()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_config_file_does_not_exist() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        drop(temp_file);

        assert!(!path.exists());

        let config = AugurConfig::read_config(Some(&path)).unwrap();
        assert_eq!(config, AugurConfig::default());
        assert!(path.exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_config_file_exists_valid_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let yaml_content = r#"
outlier-threshold: 2.5
top-k: 5
delimiter: ";"
prediction-pattern: "^fcst"
candidate-columns:
  - "load"
  - "temperature"
log-dir: "/tmp/augur-logs"
"#;
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = AugurConfig::read_config(Some(temp_file.path())).unwrap();

        assert_eq!(config.outlier_threshold, 2.5);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.prediction_pattern.as_deref(), Some("^fcst"));
        assert_eq!(
            config.candidate_columns,
            Some(vec!["load".to_string(), "temperature".to_string()])
        );
        assert_eq!(config.log_dir.as_deref(), Some("/tmp/augur-logs"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"top-k: 3\n").unwrap();

        let config = AugurConfig::read_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.outlier_threshold, DEFAULT_OUTLIER_THRESHOLD);
        assert_eq!(config.delimiter, ",");
    }

    #[test]
    fn compare_default_config() {
        let default_config = AugurConfig::default();
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(DEFAULT_DATA.as_bytes()).unwrap();
        let config = AugurConfig::read_config(Some(temp_file.path())).unwrap();
        assert_eq!(default_config, config);
    }

    #[test]
    fn test_log_dir_hint() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"log-dir: \"/tmp/augur-hint\"\noutlier-threshold: -1.0\n")
            .unwrap();
        // Read before validation, so an invalid threshold does not hide it.
        assert_eq!(
            AugurConfig::log_dir_hint(temp_file.path()).as_deref(),
            Some("/tmp/augur-hint")
        );

        let mut no_dir = NamedTempFile::new().unwrap();
        no_dir.write_all(b"top-k: 3\n").unwrap();
        assert_eq!(AugurConfig::log_dir_hint(no_dir.path()), None);

        let mut broken = NamedTempFile::new().unwrap();
        broken.write_all(b"top-k: [\n").unwrap();
        assert_eq!(AugurConfig::log_dir_hint(broken.path()), None);

        assert_eq!(AugurConfig::log_dir_hint("/definitely/not/augur.yml"), None);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"outlier-threshold: -1.0\n").unwrap();

        let result = AugurConfig::read_config(Some(temp_file.path()));
        assert!(matches!(result, Err(AugurError::BuilderError(_))));
    }

    #[test]
    fn test_invalid_delimiter_rejected() {
        let config = AugurConfig {
            delimiter: "||".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AugurError::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let config = AugurConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AugurError::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"actual-pattern: \"(unclosed\"\n")
            .unwrap();

        let result = AugurConfig::read_config(Some(temp_file.path()));
        assert!(matches!(result, Err(AugurError::InvalidPattern(_))));
    }

    #[test]
    fn test_wrong_type_is_yaml_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"top-k: many\n").unwrap();

        let result = AugurConfig::read_config(Some(temp_file.path()));
        assert!(matches!(result, Err(AugurError::SerdeYamlError(_))));
    }
}
