//! Command-line entry point: prints the reimbursement for one trip.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use reimbursement_engine::calculation::calculate_reimbursement;
use reimbursement_engine::config::{ConfigLoader, PolicyConfig};
use reimbursement_engine::error::EngineError;
use reimbursement_engine::models::TripInput;
use reimbursement_engine::telemetry;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "reimbursement-engine",
    about = "Calculate the travel reimbursement for a single trip",
    version,
    allow_negative_numbers = true
)]
struct Cli {
    /// Trip length in days
    trip_duration_days: i64,
    /// Total miles driven
    miles_traveled: Decimal,
    /// Total of submitted receipts
    total_receipts_amount: Decimal,
    /// Load policy files from this directory instead of the built-in legacy policy
    #[arg(long, value_name = "DIR")]
    config: Option<PathBuf>,
    /// Print the audit trace as JSON to stderr
    #[arg(long)]
    explain: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
    #[error("failed to render audit trace: {0}")]
    Render(#[from] serde_json::Error),
}

fn run(cli: Cli) -> Result<Decimal, CliError> {
    telemetry::init("warn")?;

    let policy = match &cli.config {
        Some(dir) => ConfigLoader::load(dir)?.config().clone(),
        None => PolicyConfig::legacy(),
    };
    debug!(policy = %policy.policy().code, "Policy loaded");

    let trip = TripInput::new(
        cli.trip_duration_days,
        cli.miles_traveled,
        cli.total_receipts_amount,
    )?;
    let result = calculate_reimbursement(&trip, &policy)?;

    if cli.explain {
        eprintln!("{}", serde_json::to_string_pretty(&result.audit_trace)?);
    }
    Ok(result.amount)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(amount) => {
            println!("{:.2}", amount);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
