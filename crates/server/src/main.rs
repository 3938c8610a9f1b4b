mod api;
mod bootstrap;
mod health;

use std::time::Duration;

use anyhow::Result;
use axum::Router;
use cartwright_core::config::{AppConfig, LoadOptions};
use tracing::{info, warn};

fn init_logging(config: &AppConfig) {
    use cartwright_core::config::LogFormat::*;
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
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    // Now bootstrap using the same config we already loaded
    let app = bootstrap::bootstrap_with_config(config).await?;

    let router = Router::new()
        .merge(api::router(app.engine.clone(), app.vocabulary.clone()))
        .merge(health::router(app.db_pool.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        session_id = "unknown",
        bind_address = %address,
        "cartwright-server listening"
    );

    let drain_budget = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        wait_for_shutdown().await;
        let _ = signal_tx.send(());
    });

    // The drain budget only starts counting once the shutdown signal fires.
    let drain_timer = async move {
        let _ = signal_rx.await;
        tokio::time::sleep(drain_budget).await;
    };

    tokio::select! {
        result = async move { server.await } => result?,
        _ = drain_timer => {
            warn!(
                event_name = "system.server.drain_timeout",
                correlation_id = "shutdown",
                session_id = "unknown",
                "open connections did not drain in time, exiting"
            );
        }
    }

    info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        session_id = "unknown",
        "cartwright-server stopped"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(error = %error, "could not listen for the shutdown signal");
        return;
    }
    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        session_id = "unknown",
        "shutdown signal received, draining connections"
    );
}
