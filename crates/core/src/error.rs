//! Error taxonomy for source fetches.
//!
//! Every per-symbol failure is classified so the retry policy can decide
//! whether another attempt is worthwhile. Classification mirrors what the
//! sources actually do: connection trouble and 5xx are transient, throttling
//! carries a server-advised wait, and a confirmed-unknown symbol is final.

use thiserror::Error;

/// Errors that can occur while fetching from an external source.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Network error (DNS, connection reset, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Source throttled the request.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the source asked us to wait before retrying.
        retry_after_secs: u64,
    },

    /// Source returned a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from the source.
        message: String,
    },

    /// Source responded but the body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Source confirmed the symbol does not exist.
    #[error("symbol unknown: {symbol}")]
    SymbolUnknown {
        /// The symbol the source rejected.
        symbol: String,
    },
}

impl FetchError {
    /// Creates an API error from status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a rate limit error.
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a symbol-unknown error.
    pub fn symbol_unknown(symbol: impl Into<String>) -> Self {
        Self::SymbolUnknown {
            symbol: symbol.into(),
        }
    }

    /// Returns true if another attempt could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::MalformedResponse(_) | Self::SymbolUnknown { .. } => false,
        }
    }

    /// Server-advised minimum wait before the next attempt, if any.
    ///
    /// The retry policy widens its backoff to at least this value.
    #[must_use]
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Self::RateLimited { retry_after_secs } => {
                Some(std::time::Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // ==================== Classification Tests ====================

    #[test]
    fn test_network_error_is_retryable() {
        assert!(FetchError::Network("connection refused".to_string()).is_retryable());
    }

    #[test]
    fn test_timeout_is_retryable() {
        assert!(FetchError::Timeout("deadline elapsed".to_string()).is_retryable());
    }

    #[test]
    fn test_rate_limited_is_retryable() {
        assert!(FetchError::rate_limited(30).is_retryable());
    }

    #[test]
    fn test_server_error_is_retryable() {
        assert!(FetchError::api(503, "service unavailable").is_retryable());
        assert!(FetchError::api(500, "internal").is_retryable());
    }

    #[test]
    fn test_client_error_is_not_retryable() {
        assert!(!FetchError::api(400, "bad request").is_retryable());
        assert!(!FetchError::api(404, "not found").is_retryable());
    }

    #[test]
    fn test_malformed_response_is_not_retryable() {
        assert!(!FetchError::MalformedResponse("no tables".to_string()).is_retryable());
    }

    #[test]
    fn test_symbol_unknown_is_not_retryable() {
        assert!(!FetchError::symbol_unknown("XYZ").is_retryable());
    }

    // ==================== Retry-After Tests ====================

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let err = FetchError::rate_limited(45);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_other_errors_have_no_retry_after() {
        assert_eq!(FetchError::Timeout("t".to_string()).retry_after(), None);
        assert_eq!(FetchError::api(500, "x").retry_after(), None);
    }

    // ==================== Display Tests ====================

    #[test]
    fn test_error_display() {
        let err = FetchError::api(429, "too many requests");
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("too many requests"));

        let err = FetchError::symbol_unknown("ACME");
        assert!(err.to_string().contains("ACME"));
    }
}
