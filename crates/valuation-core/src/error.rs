//! Error types for valuation comparison operations

use thiserror::Error;

/// Valuation comparison specific errors
#[derive(Debug, Error)]
pub enum CompareError {
    /// Data source unreachable, returned an HTTP error, or an API error body
    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable {
        source_name: String,
        reason: String,
    },

    /// A single outbound call exceeded its timeout
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: String,
        seconds: u64,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimited {
        provider: String,
    },

    /// Response body could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Industry label absent or blank
    #[error("Invalid industry label: {0:?}")]
    InvalidIndustryLabel(String),

    /// Ticker unknown to the company source, or reported without an industry
    #[error("Ticker not found or insufficient data: {0}")]
    TickerNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache persistence error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Front-end command could not be parsed
    #[error("Command error: {0}")]
    Command(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompareError {
    /// Build a `SourceUnavailable` error for a named provider
    pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Classify a transport error from `reqwest`
    pub fn from_transport(
        source_name: &str,
        operation: &str,
        timeout_secs: u64,
        err: reqwest::Error,
    ) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                operation: format!("{source_name} {operation}"),
                seconds: timeout_secs,
            }
        } else if err.is_decode() {
            Self::unavailable(source_name, format!("malformed response: {err}"))
        } else {
            Self::unavailable(source_name, err.to_string())
        }
    }

    /// Whether the failure came from reaching an external source
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, CompareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompareError::InvalidIndustryLabel(String::new());
        assert_eq!(err.to_string(), "Invalid industry label: \"\"");

        let err = CompareError::unavailable("FMP", "HTTP 503");
        assert_eq!(err.to_string(), "FMP unavailable: HTTP 503");

        let err = CompareError::Timeout {
            operation: "FMP stock-screener".to_string(),
            seconds: 15,
        };
        assert_eq!(err.to_string(), "FMP stock-screener timed out after 15s");
    }

    #[test]
    fn test_source_failure_classification() {
        assert!(CompareError::unavailable("FMP", "down").is_source_failure());
        assert!(
            CompareError::RateLimited {
                provider: "FMP".to_string()
            }
            .is_source_failure()
        );
        assert!(!CompareError::TickerNotFound("ZZZZ".to_string()).is_source_failure());
        assert!(!CompareError::InvalidIndustryLabel(" ".to_string()).is_source_failure());
    }
}
