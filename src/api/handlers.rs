//! API Request Handlers

use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::middleware::{RateLimitConfig, RateLimiter};
use super::types::*;
use crate::core::classifier::classify;
use crate::core::inspector::WalletInspector;
use crate::core::iso_export::generate_iso_xml;
use crate::models::config::SentryConfig;
use crate::models::errors::AppError;
use crate::models::types::WalletSnapshot;
use crate::utils::cache::SnapshotCache;
use crate::utils::constants::APP_VERSION;
use crate::utils::telemetry::LookupStats;

type ErrorReply = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub inspector: WalletInspector,
    pub cache: SnapshotCache,
    pub stats: LookupStats,
    pub limiter: RateLimiter,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(inspector: WalletInspector, config: &SentryConfig) -> Self {
        Self {
            inspector,
            cache: SnapshotCache::with_ttl(config.cache_ttl),
            stats: LookupStats::new(),
            limiter: RateLimiter::new(RateLimitConfig::per_minute(config.rate_limit_per_min)),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Cached lookup; only a cache miss reaches the explorers
    pub async fn lookup(&self, raw: &str) -> WalletSnapshot {
        let start = Instant::now();
        let canonical = classify(raw).canonical;

        if let Some(hit) = self.cache.get(&canonical) {
            self.stats.record(&hit, elapsed_ms(start) as u64, true);
            return hit;
        }

        let snapshot = self.inspector.inspect(raw).await;
        self.cache.set(&snapshot);
        self.stats.record(&snapshot, elapsed_ms(start) as u64, false);
        snapshot
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn require_address(raw: &str, start: Instant) -> Result<(), ErrorReply> {
    if classify(raw).canonical.is_empty() {
        warn!("Rejected lookup with empty address");
        let err = AppError::bad_request("address is required");
        let status = StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
        return Err((
            status,
            Json(ApiResponse::error(ApiError::from(&err), elapsed_ms(start))),
        ));
    }
    Ok(())
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Wallet Lookup
// ============================================

/// POST /v1/wallet/check
pub async fn check_wallet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WalletCheckRequest>,
) -> Result<Json<ApiResponse<WalletSnapshot>>, ErrorReply> {
    let start = Instant::now();
    require_address(&req.address, start)?;

    let snapshot = state.lookup(&req.address).await;
    Ok(Json(ApiResponse::success(snapshot, elapsed_ms(start))))
}

/// GET /v1/wallet/:address
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<WalletSnapshot>>, ErrorReply> {
    let start = Instant::now();
    require_address(&address, start)?;

    let snapshot = state.lookup(&address).await;
    Ok(Json(ApiResponse::success(snapshot, elapsed_ms(start))))
}

/// GET /v1/wallet/:address/iso20022
pub async fn get_wallet_iso(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, ErrorReply> {
    let start = Instant::now();
    require_address(&address, start)?;

    let snapshot = state.lookup(&address).await;
    let xml = generate_iso_xml(&snapshot, &address, chrono::Utc::now());

    info!(
        chain = %snapshot.chain_name,
        status = snapshot.status.as_str(),
        "📄 ISO 20022 export for {}",
        snapshot.address
    );

    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        xml,
    ))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let cache = state.cache.stats();

    info!(
        "📊 Cache Stats: {} entries, {:.1}% hit rate ({} hits / {} misses)",
        cache.entries, cache.hit_rate, cache.hits, cache.misses
    );

    let data = StatsData {
        lookups: state.stats.snapshot(),
        cache,
        uptime_seconds: state.uptime_seconds(),
        api_version: APP_VERSION.to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
