//! MarketWatch Lite - Entry Point

use anyhow::Result;
use clap::Parser;
use mwlite::config::{CONFIG_ENV, DEFAULT_CONFIG_PATH};
use tracing::info;

/// MarketWatch Lite market overview dashboard
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via MWLITE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config path: CLI arg > MWLITE_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = mwlite::AppConfig::load(&config_path)?;

    mwlite_telemetry::init_logging(&config.telemetry.log_level)?;
    info!("Starting MarketWatch Lite v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = %config_path,
        period = %config.period,
        fallback = ?config.fallback,
        dashboard_port = config.dashboard.port,
        "Configuration loaded"
    );

    let app = mwlite::Application::new(config)?;
    app.run().await?;

    Ok(())
}
