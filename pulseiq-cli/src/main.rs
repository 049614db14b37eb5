use clap::Parser;
use colored::*;
use config_engine::ConfigEngine;
use error_common::{log_error, PulseError, Result};
use pulseiq_cli::{commands, Args};
use pulseiq_client::PulseApp;

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = ConfigEngine::new()
        .with_file(&args.config)
        .load()
        .map_err(|e| PulseError::Config(e.to_string()))?;
    if args.verbose {
        config.logging.level = "debug".to_string();
    }
    if args.json_logs {
        config.logging.json = true;
    }
    let _logging = logger_redacted::init(&config.logging).map_err(anyhow::Error::from)?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "pulseiq starting");
    let app = PulseApp::boot(config).await?;

    if let Err(e) = commands::run(&app, args.command).await {
        log_error("command failed", &e);
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        return Err(e);
    }
    Ok(())
}
