//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so explorer outages can be told apart
//! in logs. Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ADDR_xxx: address classification errors
//! - UPSTREAM_xxx: block-explorer / RPC errors
//! - API_xxx: API errors
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Address Errors (1xx)
    // ============================================
    /// Address matches no supported chain pattern
    AddressInvalidFormat,

    // ============================================
    // Upstream Errors (2xx)
    // ============================================
    /// Could not connect to the explorer
    UpstreamConnectionFailed,
    /// Explorer request timed out
    UpstreamTimeout,
    /// Explorer rate limited us (HTTP 429)
    UpstreamRateLimited,
    /// Explorer returned a non-2xx status
    UpstreamBadStatus,
    /// Response body was not the JSON we expected
    UpstreamInvalidResponse,
    /// JSON parsed but the expected field was missing
    UpstreamMissingField,
    /// JSON-RPC error object in the response
    UpstreamRpcError,
    /// Every endpoint in the cascade failed
    UpstreamUnavailable,

    // ============================================
    // API Errors (3xx)
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors (4xx)
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddressInvalidFormat => "ADDR_INVALID_FORMAT",

            Self::UpstreamConnectionFailed => "UPSTREAM_CONNECTION_FAILED",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::UpstreamRateLimited => "UPSTREAM_RATE_LIMITED",
            Self::UpstreamBadStatus => "UPSTREAM_BAD_STATUS",
            Self::UpstreamInvalidResponse => "UPSTREAM_INVALID_RESPONSE",
            Self::UpstreamMissingField => "UPSTREAM_MISSING_FIELD",
            Self::UpstreamRpcError => "UPSTREAM_RPC_ERROR",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::AddressInvalidFormat | Self::ConfigInvalidValue => 400,
            Self::ApiRateLimited => 429,
            Self::UpstreamUnavailable => 503,
            _ => 500,
        }
    }

    /// Transient failures worth a second attempt on the same endpoint
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTimeout | Self::UpstreamRateLimited | Self::UpstreamConnectionFailed
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn invalid_format(address: &str) -> Self {
        Self::new(
            ErrorCode::AddressInvalidFormat,
            format!("Unrecognized wallet format: {}", address),
        )
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamTimeout, msg)
    }

    pub fn rate_limited() -> Self {
        Self::new(ErrorCode::UpstreamRateLimited, "Rate limited (HTTP 429)")
    }

    pub fn bad_status(status: u16) -> Self {
        Self::new(ErrorCode::UpstreamBadStatus, format!("HTTP error: {}", status))
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamInvalidResponse, msg)
    }

    /// Expected field absent from a provider payload
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::UpstreamMissingField,
            format!("Missing field in response: {}", field),
        )
    }

    pub fn rpc_error(code: i64, message: &str) -> Self {
        Self::new(
            ErrorCode::UpstreamRpcError,
            format!("RPC error: {} (code: {})", message, code),
        )
    }

    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamUnavailable, msg)
    }

    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key, value),
        )
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout("Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::UpstreamConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::UpstreamInvalidResponse, "Body decode failed", err)
        } else if let Some(status) = err.status() {
            Self::bad_status(status.as_u16())
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::UpstreamInvalidResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::timeout("Connection timed out");
        assert_eq!(err.code, ErrorCode::UpstreamTimeout);
        assert_eq!(err.code_str(), "UPSTREAM_TIMEOUT");
        assert_eq!(err.to_string(), "[UPSTREAM_TIMEOUT] Connection timed out");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::UpstreamTimeout.is_retryable());
        assert!(ErrorCode::UpstreamRateLimited.is_retryable());
        assert!(!ErrorCode::UpstreamMissingField.is_retryable());
        assert!(!AppError::bad_status(500).is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::UpstreamUnavailable.http_status(), 503);
        assert_eq!(ErrorCode::UpstreamBadStatus.http_status(), 500);
    }

    #[test]
    fn test_missing_field_message() {
        let err = AppError::missing_field("chain_stats");
        assert_eq!(err.code, ErrorCode::UpstreamMissingField);
        assert!(err.message.contains("chain_stats"));
    }
}
