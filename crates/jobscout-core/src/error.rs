use thiserror::Error;

use crate::models::Source;

/// Application-wide error types for jobscout.
///
/// Only `InvalidCriteria` and `AllSourcesFailed` ever reach the caller of a
/// search; everything else is absorbed at its boundary (per-source, per-listing)
/// and logged.
#[derive(Error, Debug)]
pub enum AppError {
    /// Search criteria rejected before any network work.
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// Every source adapter failed; no listings could be produced.
    #[error("no sources available")]
    AllSourcesFailed,

    /// One source adapter is down after retry exhaustion. Degraded, not fatal.
    #[error("source {0} unavailable: {1}")]
    SourceUnavailable(Source, String),

    /// Description fetch for a single listing failed. The listing keeps an
    /// empty description and falls through to skills-only scoring.
    #[error("enrichment failed: {0}")]
    EnrichmentFailed(String),

    /// Oracle scoring for a single listing failed. The listing degrades to
    /// its prefilter score.
    #[error("scoring failed: {0}")]
    ScoringFailed(String),

    /// Scoring oracle API call failed.
    #[error("oracle error (HTTP {status_code}): {message}")]
    OracleError {
        message: String,
        status_code: u16,
        retryable: bool,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded (HTTP 429).
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// Network/connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Configuration error.
    #[error("config error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded => true,
            AppError::OracleError { retryable, .. } => *retryable,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }
}
