//! Dipcord gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p dipcord-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use dipcord_common::{init_tracing, init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    init_tracing_with_config(TracingConfig::for_environment(config.app.env));

    if let Err(e) = run(config).await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Dipcord gateway...");

    info!(
        env = ?config.app.env,
        address = %config.gateway.address(),
        heartbeat_ms = config.gateway.heartbeat_interval_ms,
        "Configuration loaded"
    );

    dipcord_gateway::run(config).await?;

    Ok(())
}
