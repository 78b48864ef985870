mod error;
mod loader;

use crate::error::AnalyzerError;
use clap::Parser;
use log::info;
use std::{path::PathBuf, process::ExitCode};
use vibration::{PAYLOAD_INTERVAL_SECS, Summary};

/// Offline vibration telemetry analyzer
#[derive(Parser, Debug)]
#[command(version, about = "Summarize a batch of vibration telemetry payloads", long_about = None)]
struct Args {
    /// JSON file holding one telemetry object or an array of them
    path: PathBuf,

    /// Seconds between consecutive payloads
    #[arg(short, long, default_value_t = PAYLOAD_INTERVAL_SECS)]
    interval: f64,
}

fn run(args: &Args) -> Result<Summary, AnalyzerError> {
    let samples = loader::load_samples(&args.path)?;
    info!("Loaded {} payloads from {}", samples.len(), args.path.display());

    Ok(Summary::from_samples(&samples, args.interval)?)
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let args = Args::parse();

    match run(&args) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
