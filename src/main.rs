// =============================================================================
// Holder Radar — Main Entry Point
// =============================================================================
//
// Fetches the top of the CoinGecko market table, scores each eligible asset
// on a 0–100 holder scale and serves the ranked table to the dashboard over
// REST and WebSocket. A background task keeps the cached table fresh.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use holder_radar::api;
use holder_radar::app_state::AppState;
use holder_radar::coingecko::CoinGeckoClient;
use holder_radar::pipeline::{run_refresh_loop, RadarPipeline};
use holder_radar::runtime_config::{RuntimeConfig, CONFIG_PATH};
use holder_radar::scoring::HolderScorer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Holder Radar starting up");

    let config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    info!(
        vs_currency = %config.vs_currency,
        per_page = config.per_page,
        top_n = config.top_n,
        cache_ttl_secs = config.cache_ttl_secs,
        "Universe configured"
    );
    if std::env::var(api::auth::ADMIN_TOKEN_ENV).map_or(true, |t| t.is_empty()) {
        warn!("{} not set — control endpoints disabled", api::auth::ADMIN_TOKEN_ENV);
    }

    // ── 2. Build shared state & data source ──────────────────────────────
    let api_key = std::env::var("COINGECKO_API_KEY").ok();
    let client = CoinGeckoClient::new(config.coingecko_base_url.clone(), api_key.as_deref())?;
    let state = Arc::new(AppState::new(config));

    // ── 3. Refresh loop ──────────────────────────────────────────────────
    let scorer = HolderScorer::default();
    info!(slots = ?scorer.slot_names(), "placeholder signal slots");
    let pipeline = RadarPipeline::new(client, scorer);
    tokio::spawn(run_refresh_loop(state.clone(), pipeline));

    // ── 4. API server ────────────────────────────────────────────────────
    let bind_addr =
        std::env::var("HOLDER_RADAR_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping");
    server.abort();

    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Holder Radar shut down complete.");
    Ok(())
}
