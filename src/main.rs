use anyhow::Context;
use tracing_subscriber::EnvFilter;

use reels_api::{app, config::AppConfig, database, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up CONNECTION_URI, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting Reels API in {:?} mode", config.environment);
    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; signing tokens with the development secret");
    }

    let store = database::connect(&config.database)
        .await
        .context("failed to open store")?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(config, store);
    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Reels API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
