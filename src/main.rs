use std::env;
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};

use healthlog::api::RestApi;
use healthlog::config::{load_config_or_default, LoggingConfig};
use healthlog::{build_tracker, TrackerError};

const CONFIG_ENV: &str = "HEALTHLOG_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let config = load_config_or_default(&config_path)?;

    init_logging(&config.logging);
    info!(config = %config_path.display(), "starting HealthLog");

    let tracker = build_tracker(&config)?;
    let api = RestApi::new(tracker);

    let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port)
        .parse()
        .map_err(|err| TrackerError::Server(format!("invalid listen address: {}", err)))?;

    // Create a channel for shutdown signal
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let (bound, server) = warp::serve(api.routes())
        .try_bind_with_graceful_shutdown(addr, async move {
            shutdown_rx.await.ok();
            info!("shutting down server");
        })
        .map_err(|err| TrackerError::Server(err.to_string()))?;
    info!(%bound, "listening");

    let server_handle = tokio::spawn(server);

    signal::ctrl_c().await?;
    info!("Ctrl+C received, starting graceful shutdown");
    shutdown_tx.send(()).ok();

    if let Err(err) = server_handle.await {
        error!(error = %err, "server task failed");
        return Err(Box::new(TrackerError::Server(err.to_string())) as Box<dyn Error>);
    }

    info!("server shutdown complete");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logging.filter.as_str().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();
}
