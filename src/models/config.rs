//! Configuration module for Wallet Sentry
//!
//! Uses defaults from utils/constants.rs, overridable through environment
//! variables (optionally loaded from `.env`).

use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_PORT,
    DEFAULT_RATE_LIMIT_PER_MIN,
};

/// Runtime configuration shared by the CLI and the API server
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Bind address for the API server
    pub host: String,
    pub port: u16,
    /// Per-call timeout for explorer requests
    pub http_timeout: Duration,
    /// Attempts per endpoint before cascading
    pub max_attempts: u32,
    /// Snapshot cache TTL
    pub cache_ttl: Duration,
    /// Requests per minute per client IP
    pub rate_limit_per_min: u32,
    /// Enables Etherscan v2 as first EVM source. Never logged.
    pub etherscan_api_key: Option<String>,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            rate_limit_per_min: DEFAULT_RATE_LIMIT_PER_MIN,
            etherscan_api_key: None,
        }
    }
}

impl SentryConfig {
    /// Load from `.env` (if present) and the process environment
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let config = Self::from_source(|key| std::env::var(key).ok())?;

        if config.etherscan_api_key.is_some() {
            info!("🔑 ETHERSCAN_API_KEY configured (key hidden for security)");
        }
        Ok(config)
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_source<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("SENTRY_PORT").or_else(|| get("PORT")) {
            Some(raw) => parse_value("SENTRY_PORT", &raw)?,
            None => defaults.port,
        };

        let http_timeout = match get("SENTRY_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("SENTRY_HTTP_TIMEOUT_SECS", &raw)?),
            None => defaults.http_timeout,
        };

        let max_attempts = match get("SENTRY_HTTP_MAX_ATTEMPTS") {
            Some(raw) => parse_positive::<u32>("SENTRY_HTTP_MAX_ATTEMPTS", &raw)?,
            None => defaults.max_attempts,
        };

        let cache_ttl = match get("SENTRY_CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_value("SENTRY_CACHE_TTL_SECS", &raw)?),
            None => defaults.cache_ttl,
        };

        let rate_limit_per_min = match get("SENTRY_RATE_LIMIT_PER_MIN") {
            Some(raw) => parse_positive("SENTRY_RATE_LIMIT_PER_MIN", &raw)?,
            None => defaults.rate_limit_per_min,
        };

        let etherscan_api_key = get("ETHERSCAN_API_KEY").filter(|k| k != "YOUR_API_KEY");

        Ok(Self {
            host: get("SENTRY_HOST").unwrap_or(defaults.host),
            port,
            http_timeout,
            max_attempts,
            cache_ttl,
            rate_limit_per_min,
            etherscan_api_key,
        })
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.parse::<T>()
        .map_err(|_| AppError::invalid_config(key, raw))
}

fn parse_positive<T>(key: &str, raw: &str) -> AppResult<T>
where
    T: FromStr + PartialOrd + Default,
{
    let value: T = parse_value(key, raw)?;
    if value <= T::default() {
        return Err(AppError::invalid_config(key, raw));
    }
    Ok(value)
}
