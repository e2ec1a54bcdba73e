use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;

use crate::config::{ConfigError, ServerConfig};
use crate::pipeline::Pipeline;
use crate::routes::{api_routes, metrics_routes};

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Metrics setup failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Creates the router serving the default routes.
pub fn create_router(config: &ServerConfig) -> Router {
    create_router_with_routes(config, api_routes())
}

/// Creates the router serving the given route table.
pub fn create_router_with_routes(config: &ServerConfig, routes: Router) -> Router {
    Pipeline::assemble(config).apply(routes)
}

/// Runs the server until Ctrl+C or SIGTERM.
pub async fn run_server(
    config: ServerConfig,
    prometheus_handle: Option<PrometheusHandle>,
) -> Result<(), ServerError> {
    let addr = config.listen_addr()?;

    let mut routes = api_routes();
    if let Some(handle) = prometheus_handle {
        routes = routes.merge(metrics_routes(handle));
    }
    let app = create_router_with_routes(&config, routes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
