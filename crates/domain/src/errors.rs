//! Error types used throughout the client
//!
//! Provides error classification for API operations with retry metadata.
//! The retryability decisions here are a documented contract: network
//! failures and HTTP 429/502/503/504 retry, everything else surfaces
//! immediately.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network/connection errors - retryable
    Network,
    /// Rate limiting (429) - retryable with backoff
    RateLimit,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except 429)
    Client,
    /// Caller cancellation - never retried
    Cancelled,
    /// Unreadable body or unusable payload - non-retryable
    Malformed,
    /// The awaited operation reached a failure terminal state
    OperationFailed,
    /// Deadline reached without a terminal state
    TimedOut,
    /// Configuration errors - non-retryable
    Config,
}

/// Main error type for API operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, DNS, reset, I/O timeout).
    #[error("network error: {0}")]
    Network(String),

    /// Structured error envelope returned by the API.
    #[error("{status}: {code} - {message}")]
    Api { status: u16, code: String, message: String },

    /// HTTP error without a parseable envelope; carries the raw body.
    #[error("{status}: {body}")]
    Http { status: u16, body: String },

    /// Redirect chain exceeded the hop cap.
    #[error("stopped after {0} redirects")]
    TooManyRedirects(u32),

    /// The caller's cancellation token fired.
    #[error("request cancelled")]
    Cancelled,

    /// Body could not be read, encoded, or decoded.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// The awaited operation itself failed. Distinct from a transport error:
    /// the job failed, not the status check.
    #[error("operation {id} failed with status {status}")]
    OperationFailed { id: String, status: String },

    /// Deadline elapsed before the operation reached a terminal state.
    #[error("timeout waiting for operation {id} (last status: {last_status})")]
    Timeout { id: String, last_status: String },

    /// Client misconfiguration (missing token, invalid base URL, bad policy).
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Api { status, .. } | Self::Http { status, .. } => match status {
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::TooManyRedirects(_) | Self::Malformed(_) => ErrorCategory::Malformed,
            Self::OperationFailed { .. } => ErrorCategory::OperationFailed,
            Self::Timeout { .. } => ErrorCategory::TimedOut,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Whether the executor may attempt this call again.
    ///
    /// Total over every variant: network failures and 429/502/503/504
    /// retry; any other HTTP status, cancellation, malformed payloads,
    /// operation failures, and timeouts do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } | Self::Http { status, .. } => {
                matches!(status, 429 | 502 | 503 | 504)
            }
            Self::TooManyRedirects(_)
            | Self::Cancelled
            | Self::Malformed(_)
            | Self::OperationFailed { .. }
            | Self::Timeout { .. }
            | Self::Config(_) => false,
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error envelope returned by the API on failure responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

/// Details inside the error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> ApiError {
        ApiError::Http { status, body: String::new() }
    }

    #[test]
    fn network_errors_are_retryable() {
        assert!(ApiError::Network("connection refused".into()).is_retryable());
        assert!(ApiError::Network("dns failure".into()).is_retryable());
    }

    #[test]
    fn retryable_status_allowlist() {
        for status in [429, 502, 503, 504] {
            assert!(http(status).is_retryable(), "expected {status} to retry");
            let api = ApiError::Api { status, code: "x".into(), message: "y".into() };
            assert!(api.is_retryable(), "expected envelope {status} to retry");
        }
    }

    #[test]
    fn other_statuses_do_not_retry() {
        for status in [400, 401, 403, 404, 409, 422, 500, 501, 505] {
            assert!(!http(status).is_retryable(), "expected {status} not to retry");
        }
    }

    #[test]
    fn cancellation_never_retries() {
        assert!(!ApiError::Cancelled.is_retryable());
        let timeout = ApiError::Timeout { id: "op".into(), last_status: "PENDING".into() };
        assert!(!timeout.is_retryable());
    }

    #[test]
    fn terminal_and_local_errors_do_not_retry() {
        assert!(!ApiError::TooManyRedirects(10).is_retryable());
        assert!(!ApiError::Malformed("truncated".into()).is_retryable());
        let failed = ApiError::OperationFailed { id: "op".into(), status: "FAILED".into() };
        assert!(!failed.is_retryable());
        assert!(!ApiError::Config("missing token".into()).is_retryable());
    }

    #[test]
    fn categories_follow_status_ranges() {
        assert_eq!(http(429).category(), ErrorCategory::RateLimit);
        assert_eq!(http(404).category(), ErrorCategory::Client);
        assert_eq!(http(503).category(), ErrorCategory::Server);
        assert_eq!(ApiError::Cancelled.category(), ErrorCategory::Cancelled);
    }

    #[test]
    fn envelope_parses_with_missing_fields() {
        let parsed: ErrorEnvelope = serde_json::from_str(r#"{"error":{"code":"notFound"}}"#)
            .expect("envelope should parse");
        assert_eq!(parsed.error.code, "notFound");
        assert!(parsed.error.message.is_empty());
    }
}
