use chrono::Local;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::error::AugurError;

/// Sets up tracing with INFO+ to console and DEBUG+ from this crate to a file.
///
/// The returned guard must be held for as long as file logging should keep
/// flushing.
pub fn setup_tracing(log_dir: Option<&str>) -> Result<WorkerGuard, AugurError> {
    let log_dir_str = log_dir.unwrap_or("logs");
    let log_dir = Path::new(log_dir_str);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();

    let file_appender = tracing_appender::rolling::never(log_dir_str, format!("{}.log", timestamp));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_level(true)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(EnvFilter::from_default_env().add_directive(directive("INFO")?));

    // File layer: DEBUG and above only for this crate
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_filter(EnvFilter::from_default_env().add_directive(directive("augur=DEBUG")?));

    let subscriber = Registry::default().with(console_layer).with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AugurError::ConfigError(format!("Failed to install subscriber: {}", e)))?;

    info!(log_dir = %log_dir.display(), "Tracing initialized");

    Ok(guard)
}

fn directive(value: &str) -> Result<tracing_subscriber::filter::Directive, AugurError> {
    value
        .parse()
        .map_err(|e| AugurError::ConfigError(format!("Invalid log directive {}: {}", value, e)))
}
