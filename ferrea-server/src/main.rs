//! Ferrea Server - ISBN metadata gateway

use anyhow::{Context, Result};
use ferrea_core::Settings;
use ferrea_server::{routes, state};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferrea_server=debug,ferrea_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("Invalid configuration")?;
    tracing::info!(
        providers = ?settings.providers,
        policy = %settings.merge_policy,
        timeout = ?settings.http_timeout,
        "loaded settings"
    );

    let state = state::AppState::from_settings(&settings)?;
    let app = routes::create_router(state);

    let addr: SocketAddr = std::env::var("FERREA_BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("FERREA_BIND_ADDR is not a socket address")?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
