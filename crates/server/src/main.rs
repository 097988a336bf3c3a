mod bootstrap;
mod health;

use anyhow::Result;
use slotboard_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use slotboard_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Logging needs the loaded config, so config errors surface on stderr via anyhow.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config);

    health::spawn(&app.config.server.bind_address, app.config.server.health_check_port).await?;

    app.slack_runner.start().await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        "slotboard-server started"
    );
    wait_for_shutdown(app.config.server.graceful_shutdown_secs).await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "slotboard-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown(grace_secs: u64) -> Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!(
        event_name = "system.server.shutdown_requested",
        correlation_id = "shutdown",
        grace_secs,
        "shutdown signal received"
    );
    Ok(())
}
