use std::error::Error;

use augur::{
    analysis::pipeline::{Pipeline, Report},
    args::Args,
    config::AugurConfig,
    data::{record::RawRecord, sample::generate_sample},
    logging::setup_tracing,
};
use clap::Parser;
use tracing::{info, warn};

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let log_dir = AugurConfig::log_dir_hint(&args.config);
    let _guard = setup_tracing(log_dir.as_deref())?;
    let config = AugurConfig::read_config(Some(&args.config))?;

    let mut pipeline = Pipeline::from_config(&config)?;
    if args.columns.is_some() {
        pipeline = pipeline.with_candidates(args.columns.clone());
    }

    let records = load_records(&pipeline, &args);
    let report = pipeline.run_records(records);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Reads the input file, falling back to generated sample data when there is
/// no file or it cannot be read.
fn load_records(pipeline: &Pipeline, args: &Args) -> Vec<RawRecord> {
    match &args.input {
        Some(path) => match pipeline.ingestor().ingest_file(path) {
            Ok(records) => {
                info!(rows = records.len(), "Loaded input file");
                records
            }
            Err(e) => {
                warn!("{}. Falling back to sample data", e);
                generate_sample(args.sample_rows, args.seed)
            }
        },
        None => {
            info!("No input file given, using sample data");
            generate_sample(args.sample_rows, args.seed)
        }
    }
}

fn print_report(report: &Report) {
    println!("Records: {}", report.records.len());
    println!(
        "Missing filled: {} | Outliers capped: {} | Types converted: {}",
        report.cleaning.missing, report.cleaning.abnormal, report.cleaning.type_converted
    );
    println!(
        "Mean prediction: {:.4} | Mean actual: {:.4} | Correlation: {:.4}",
        report.summary.mean_prediction,
        report.summary.mean_actual,
        report.summary.prediction_actual_correlation
    );
    if report.influence.is_empty() {
        println!("No feature columns to rank");
        return;
    }
    println!("Influence weight:");
    for (rank, weight) in report.influence.iter().enumerate() {
        println!("{:>3}. {:<24} {:.4}", rank + 1, weight.name, weight.weight);
    }
}
