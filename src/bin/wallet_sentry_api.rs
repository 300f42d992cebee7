//! Wallet Sentry API Server
//!
//! REST API for multi-chain wallet risk lookups and ISO 20022 exports
//!
//! Usage:
//!   cargo run --bin wallet_sentry_api
//!
//! Environment:
//!   PORT / SENTRY_PORT        - Server port (default: 8080)
//!   SENTRY_HOST               - Server host (default: 0.0.0.0)
//!   SENTRY_HTTP_TIMEOUT_SECS  - Explorer call timeout (default: 10)
//!   SENTRY_HTTP_MAX_ATTEMPTS  - Attempts per explorer (default: 2)
//!   SENTRY_CACHE_TTL_SECS     - Snapshot cache TTL (default: 60)
//!   SENTRY_RATE_LIMIT_PER_MIN - Requests per client per minute (default: 60)
//!   ETHERSCAN_API_KEY         - Optional, enables Etherscan v2 for EVM chains
//!   RUST_LOG                  - Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wallet_sentry::api::{create_router, start_cleanup_task, AppState};
use wallet_sentry::utils::constants::{APP_NAME, APP_VERSION};
use wallet_sentry::{SentryConfig, WalletInspector};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = SentryConfig::from_env()?;
    let inspector = WalletInspector::from_config(&config)?;
    let state = Arc::new(AppState::new(inspector, &config));

    start_cleanup_task(state.clone(), Duration::from_secs(60));
    info!("🧹 Background cleanup task started");

    let app = create_router(state.clone());
    let addr: SocketAddr = config.bind_addr().parse()?;

    info!("🚀 {} API v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /v1/wallet/check               - Risk lookup ({{\"address\": ...}})");
    info!("  GET  /v1/wallet/:address            - Risk lookup");
    info!("  GET  /v1/wallet/:address/iso20022   - ISO 20022 pain.001 export");
    info!("  GET  /v1/stats                      - Lookup statistics");
    info!("  GET  /v1/health                     - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("");
    info!("🛑 Shutdown signal received");

    let stats = state.stats.snapshot();
    info!("   Total lookups: {}", stats.total_lookups);
    info!(
        "   ok: {} | partial: {} | rejected: {} | invalid: {}",
        stats.ok, stats.partial, stats.rejected, stats.invalid_format
    );
    info!("   Cache hits: {}", stats.cache_hits);

    info!("👋 Wallet Sentry API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════╗
    ║                                                      ║
    ║        W A L L E T   S E N T R Y   A P I             ║
    ║                                                      ║
    ║   EVM · Bitcoin · TRON · XRP · Solana · Hedera       ║
    ║          Risk lookup + ISO 20022 export              ║
    ║                                                      ║
    ╚══════════════════════════════════════════════════════╝
    "#
    );
}
