//! HTTP server entry point.

use std::path::PathBuf;

use clap::Parser;
use reimbursement_engine::api::{AppState, create_router};
use reimbursement_engine::config::{ConfigLoader, ServerSettings, SettingsError};
use reimbursement_engine::error::EngineError;
use reimbursement_engine::telemetry::{self, TelemetryError};
use thiserror::Error;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "reimbursement-server",
    about = "Serve the reimbursement engine over HTTP",
    version
)]
struct Cli {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Serve the policy in this directory instead of the built-in legacy policy
    #[arg(long, value_name = "DIR")]
    policy_dir: Option<PathBuf>,
    /// Fallback log filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut settings = ServerSettings::from_env()?;
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(dir) = cli.policy_dir {
        settings.policy_dir = Some(dir);
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }

    telemetry::init(&settings.log_level)?;

    let loader = match &settings.policy_dir {
        Some(dir) => ConfigLoader::load(dir)?,
        None => ConfigLoader::legacy(),
    };
    info!(
        policy = %loader.policy().code,
        version = %loader.policy().version,
        "Policy loaded"
    );

    let addr = settings.socket_addr()?;
    let app = create_router(AppState::new(loader));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Reimbursement server ready");

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
