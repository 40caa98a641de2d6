use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use translator_bot::{config::Config, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translator_bot=info".parse()?),
        )
        .init();

    info!("Starting translator bot");

    let config = Config::from_env()?;
    let state = server::AppState::from_config(&config)?;
    let app = server::router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    info!("✓ Listening on port {}", config.port);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
