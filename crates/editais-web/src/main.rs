//! Editais Web Server
//!
//! Run with: cargo run -p editais-web

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use editais_client::HttpEditaisApi;
use editais_common::EditaisConfig;
use editais_web::{router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("editais=debug,info")),
        )
        .init();

    let config = EditaisConfig::load()?;
    info!(api = %config.api.base_url, "Starting editais web server...");

    let api = HttpEditaisApi::new(&config.api)?;
    let bind = config.server.bind.clone();
    let state = AppState::new(config, Arc::new(api));

    if let Err(e) = state.refresh_catalog().await {
        warn!(error = %e, "Initial catalog load failed; retrying on first page view");
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server listening on http://{}", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
