//! Airnet Server - HTTP front end for the network planning engine

use airnet_data::load_snapshot;
use airnet_server::{api, config::Config, state::AppState};
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("airnet_server=debug".parse()?)
        .add_directive("airnet_data=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_json)?;

    tracing::info!("Starting Airnet Server...");

    let snapshot = match load_snapshot(&config.data_dir) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            tracing::warn!(
                error = %err,
                data_dir = %config.data_dir.display(),
                "Data not loaded; serving in degraded mode"
            );
            None
        }
    };

    let port = config.server_port;
    let state = Arc::new(AppState::new(snapshot, config));
    let app = api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
