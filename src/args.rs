use std::path::PathBuf;

use clap::Parser;

/// Cleans a prediction/actual dataset and ranks feature influence.
#[derive(Parser, Debug)]
#[clap(name = "augur", version)]
pub struct Args {
    /// Delimited text file to analyse; a generated sample is used when absent or unreadable
    pub input: Option<PathBuf>,
    /// Path to the YAML configuration file
    #[clap(short, long, env = "AUGUR_CONFIG", default_value = "augur.yml")]
    pub config: PathBuf,
    /// Print the full report as JSON
    #[clap(short, long)]
    pub json: bool,
    /// Columns to rank, comma separated
    #[clap(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
    /// Rows of sample data to generate when falling back
    #[clap(long, default_value = "240")]
    pub sample_rows: usize,
    /// Seed for the sample data generator
    #[clap(long, default_value = "42")]
    pub seed: u64,
}
