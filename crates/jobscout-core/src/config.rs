use std::time::Duration;

use crate::error::AppError;
use crate::retry::RetryConfig;
use crate::score::ScoringWeights;

/// Pipeline tuning knobs, constructed once at process start and threaded
/// through the pipeline — no ambient globals.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How many listings receive the expensive enrichment + oracle pass.
    pub top_k: usize,
    /// How many listings to request from each source (higher than the final
    /// limit so scoring has something to choose from).
    pub per_source_limit: usize,
    /// Budget for one source fetch; a slow source is treated as empty.
    pub source_timeout: Duration,
    /// Backoff policy shared by all outbound call sites.
    pub retry: RetryConfig,
    /// Scoring signal weights.
    pub weights: ScoringWeights,
    /// Result cache entry count bound.
    pub cache_capacity: u64,
    /// Result cache time-to-live.
    pub cache_ttl: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            per_source_limit: 5,
            source_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            weights: ScoringWeights::default(),
            cache_capacity: 256,
            cache_ttl: Duration::from_secs(600),
        }
    }
}

impl SearchConfig {
    /// Read overrides from environment variables.
    ///
    /// - `JOBSCOUT_TOP_K` (optional, defaults to 6)
    /// - `JOBSCOUT_SOURCE_TIMEOUT_SECS` (optional, defaults to 30)
    /// - `JOBSCOUT_MAX_RETRIES` (optional, defaults to 3)
    /// - `JOBSCOUT_CACHE_TTL_SECS` (optional, defaults to 600)
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(top_k) = env_parse::<usize>("JOBSCOUT_TOP_K")? {
            if top_k == 0 {
                return Err(AppError::ConfigError(
                    "JOBSCOUT_TOP_K must be at least 1".into(),
                ));
            }
            config.top_k = top_k;
        }
        if let Some(secs) = env_parse::<u64>("JOBSCOUT_SOURCE_TIMEOUT_SECS")? {
            config.source_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = env_parse::<u32>("JOBSCOUT_MAX_RETRIES")? {
            config.retry.max_attempts = max.max(1);
        }
        if let Some(secs) = env_parse::<u64>("JOBSCOUT_CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw.parse().map(Some).map_err(|_| {
            AppError::ConfigError(format!("Invalid {name} '{raw}': failed to parse"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let c = SearchConfig::default();
        assert_eq!(c.top_k, 6);
        assert_eq!(c.per_source_limit, 5);
        assert_eq!(c.source_timeout, Duration::from_secs(30));
        assert_eq!(c.retry.max_attempts, 3);
    }
}
