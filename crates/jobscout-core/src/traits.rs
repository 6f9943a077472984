use std::future::Future;

use crate::error::AppError;
use crate::models::{Listing, RawListing, SearchCriteria, Source};

/// Fetches raw listings from one external job source.
///
/// Each adapter is independently failable; the pipeline must function with
/// any subset of adapters down.
pub trait SourceAdapter: Send + Sync + Clone {
    /// Which source this adapter speaks for.
    fn source(&self) -> Source;

    fn fetch(
        &self,
        criteria: &SearchCriteria,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<RawListing>, AppError>> + Send;
}

/// Fetches the full description text for a single listing.
pub trait DescriptionFetcher: Send + Sync + Clone {
    fn fetch_description(
        &self,
        listing: &Listing,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// External service that judges semantic match quality between a listing
/// and a search profile. Treated as a pure function: prompt in, scalar in
/// [0, 1] out, no state across calls.
pub trait ScoreOracle: Send + Sync + Clone {
    fn score(&self, prompt: &str) -> impl Future<Output = Result<f64, AppError>> + Send;
}

/// A no-op DescriptionFetcher for pipelines that skip enrichment.
#[derive(Debug, Clone)]
pub struct NullDescriptionFetcher;

impl DescriptionFetcher for NullDescriptionFetcher {
    async fn fetch_description(&self, _listing: &Listing) -> Result<String, AppError> {
        Ok(String::new())
    }
}
