//! Portico server binary.

use portico_server::{ServerConfig, metrics::init_metrics, run_server};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // portico.{toml,yaml,json} + PORTICO_* variables
    let config = ServerConfig::load()?;

    tracing::info!(
        environment = %config.environment,
        "Starting Portico server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let prometheus_handle = if config.metrics.enabled {
        Some(init_metrics()?)
    } else {
        tracing::info!("Metrics endpoint disabled");
        None
    };

    run_server(config, prometheus_handle).await?;

    Ok(())
}
