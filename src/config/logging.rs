//! Logging configuration module
//!
//! Provides configurable JSON/Pretty logging output and a small helper for
//! keeping secrets (the bot token) out of log lines.
//!
//! # Usage
//! ```rust,ignore
//! use price_alert_bot::config::logging::init_logging;
//! init_logging();
//! ```
//!
//! # Environment Variables
//! - `LOG_FORMAT`: Output format - `json` (default) or `pretty`
//! - `RUST_LOG`: Log level filter (default: `info`)

use std::fmt;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Initialize logging with configurable format
///
/// Reads `LOG_FORMAT` from environment:
/// - `json` (default): Machine-parseable JSON output for production
/// - `pretty`: Human-readable output for development
///
/// Also respects `RUST_LOG` for log level filtering (default: `info`)
pub fn init_logging() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if is_pretty(&log_format) {
        // Human-readable for development
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .pretty()
            .init();
    } else {
        // JSON for production (default)
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    }
}

fn is_pretty(log_format: &str) -> bool {
    log_format == "pretty"
}

/// Wrapper for sensitive values in log fields
///
/// Shows the first four characters of long values, fully redacts short ones.
#[derive(Clone)]
pub struct SanitizedValue<'a>(&'a str);

impl<'a> SanitizedValue<'a> {
    pub fn new(value: &'a str) -> Self {
        Self(value)
    }
}

impl fmt::Display for SanitizedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get(..4) {
            Some(prefix) if self.0.len() > 8 => write!(f, "{}...REDACTED", prefix),
            _ => write!(f, "REDACTED"),
        }
    }
}

impl fmt::Debug for SanitizedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SanitizedValue(***)")
    }
}

/// Shorthand for `SanitizedValue::new(value)`
pub fn sanitize(value: &str) -> SanitizedValue<'_> {
    SanitizedValue::new(value)
}

#[cfg(test)]
mod tests {
    // init_logging() itself is not unit tested: a global subscriber can only
    // be installed once per process.
    use super::*;

    #[test]
    fn test_pretty_format_detection() {
        let test_cases = vec![
            ("pretty", true),
            ("json", false),
            ("PRETTY", false), // Case sensitive
            ("", false),
            ("other", false),
        ];

        for (input, expected_pretty) in test_cases {
            assert_eq!(is_pretty(input), expected_pretty, "Failed for input: {}", input);
        }
    }

    #[test]
    fn test_env_filter_fallback() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
        assert!(!format!("{:?}", filter).is_empty());
    }

    #[test]
    fn test_sanitize_long_token() {
        let token = "123456789:AAHV5f8RKBq-secret";
        assert_eq!(sanitize(token).to_string(), "1234...REDACTED");
        assert!(!format!("{:?}", sanitize(token)).contains("secret"));
    }

    #[test]
    fn test_sanitize_short_and_empty() {
        assert_eq!(sanitize("abc").to_string(), "REDACTED");
        assert_eq!(sanitize("").to_string(), "REDACTED");
    }
}
