//! Adapter error types
//!
//! Market-data and messaging failures are kept in separate enums so the
//! engine can classify them: a `MarketDataError` leaves the symbol
//! unresolved for the tick, a `MessagingError` keeps the alert for retry.

use thiserror::Error;

/// Errors from the market data provider
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// Transport-level failure (DNS, TLS, connection reset...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Unexpected status {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    /// Body could not be decoded or had an unexpected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Call did not complete within the configured timeout
    #[error("Fetch timeout after {0}ms")]
    Timeout(u64),

    /// Configured base URL cannot carry a chart path
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Errors from the outbound messaging transport
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport reached the API but the API refused the call
    #[error("Message rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Send timeout after {0}ms")]
    Timeout(u64),
}

/// Result type alias for market data operations
pub type MarketDataResult<T> = std::result::Result<T, MarketDataError>;

/// Result type alias for messaging operations
pub type MessagingResult<T> = std::result::Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = MarketDataError::Status {
            symbol: "TCS.NS".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "Unexpected status 503 for TCS.NS");
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(
            MarketDataError::Timeout(10_000).to_string(),
            "Fetch timeout after 10000ms"
        );
        assert_eq!(MessagingError::Timeout(500).to_string(), "Send timeout after 500ms");
    }

    #[test]
    fn test_invalid_base_url_display() {
        let err = MarketDataError::InvalidBaseUrl("mailto:x".to_string());
        assert_eq!(err.to_string(), "Invalid base URL: mailto:x");
    }

    #[test]
    fn test_rejected_display() {
        let err = MessagingError::Rejected("Forbidden: bot was blocked by the user".to_string());
        assert_eq!(
            err.to_string(),
            "Message rejected: Forbidden: bot was blocked by the user"
        );
    }
}
