//! Explorer HTTP Client
//!
//! One shared `reqwest` client for every block-explorer call:
//! 1. User-Agent header (several public explorers reject anonymous agents)
//! 2. Gzip compression
//! 3. Per-call timeout
//! 4. Exponential backoff with jitter on retryable failures (timeout, 429,
//!    connection refused), bounded by `max_attempts` per endpoint
//! 5. JSON-RPC envelope handling (error object, missing result)

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::config::SentryConfig;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    RETRY_BASE_MS, RETRY_JITTER_PERCENT, RETRY_MAX_MS, USER_AGENT as USER_AGENT_CONST,
};

/// Shared HTTP client with retry policy
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    max_attempts: u32,
}

impl HttpClient {
    pub fn new(timeout: Duration, max_attempts: u32) -> AppResult<Self> {
        Ok(Self {
            client: Self::build_client(timeout)?,
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn from_config(config: &SentryConfig) -> AppResult<Self> {
        Self::new(config.http_timeout, config.max_attempts)
    }

    /// Build HTTP client with custom headers and gzip
    fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))
    }

    /// GET a JSON document
    pub async fn get_json(&self, url: &str) -> AppResult<Value> {
        self.with_retry(url, || self.client.get(url)).await
    }

    /// POST a JSON body, expect a JSON document back
    pub async fn post_json(&self, url: &str, body: &Value) -> AppResult<Value> {
        self.with_retry(url, || self.client.post(url).json(body)).await
    }

    /// Execute a JSON-RPC 2.0 call and return its `result`
    pub async fn rpc_call(&self, url: &str, method: &str, params: Value) -> AppResult<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        let response = self.post_json(url, &payload).await?;
        extract_rpc_result(response)
    }

    async fn with_retry<F>(&self, url: &str, build: F) -> AppResult<Value>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                debug!(
                    "⏳ Retry {}/{} for {} after {}ms",
                    attempt + 1,
                    self.max_attempts,
                    url,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match Self::execute(build()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    warn!(url = %url, code = e.code_str(), "⚠️ Retryable explorer failure: {}", e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute(request: RequestBuilder) -> AppResult<Value> {
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rate_limited());
        }
        if !status.is_success() {
            return Err(AppError::bad_status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Exponential backoff (base doubling, capped) with ±jitter
pub fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let capped = RETRY_BASE_MS.saturating_mul(1u64 << exp).min(RETRY_MAX_MS);
    let jitter_range = (capped * RETRY_JITTER_PERCENT / 100) as i64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(-jitter_range..=jitter_range)
    } else {
        0
    };
    Duration::from_millis((capped as i64 + jitter).max(50) as u64)
}

/// Unwrap a JSON-RPC response envelope
pub fn extract_rpc_result(mut response: Value) -> AppResult<Value> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(AppError::rpc_error(code, message));
    }

    match response.get_mut("result").map(Value::take) {
        Some(result) if !result.is_null() => Ok(result),
        _ => Err(AppError::missing_field("result")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    #[test]
    fn test_backoff_bounds() {
        for attempt in 1..10 {
            let delay = backoff_delay(attempt).as_millis() as u64;
            let max = RETRY_MAX_MS + RETRY_MAX_MS * RETRY_JITTER_PERCENT / 100;
            assert!(delay >= 50 && delay <= max, "attempt {} gave {}ms", attempt, delay);
        }
        let first = backoff_delay(1).as_millis() as u64;
        assert!(first <= RETRY_BASE_MS + RETRY_BASE_MS * RETRY_JITTER_PERCENT / 100);
    }

    #[test]
    fn test_rpc_result_extracted() {
        let result = extract_rpc_result(json!({"jsonrpc": "2.0", "id": 1, "result": "0x10"}));
        assert_eq!(result.unwrap(), json!("0x10"));
    }

    #[test]
    fn test_rpc_error_object() {
        let err = extract_rpc_result(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "invalid address"}
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamRpcError);
        assert!(err.message.contains("invalid address"));
    }

    #[test]
    fn test_rpc_missing_result() {
        let err = extract_rpc_result(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamMissingField);
    }
}
