//! Selective description enrichment.
//!
//! Description fetches are the most expensive and rate-limit-sensitive
//! outbound call, so only the top prefilter-ranked listings receive one,
//! under a hard fetch budget. A failed fetch is non-fatal: the listing keeps
//! its empty description and falls through to skills-only scoring.

use crate::models::Listing;
use crate::retry::{Caller, RetryConfig};
use crate::traits::DescriptionFetcher;

#[derive(Clone)]
pub struct Enricher<D: DescriptionFetcher> {
    fetcher: D,
    caller: Caller,
    max_fetches: usize,
}

impl<D: DescriptionFetcher> Enricher<D> {
    pub fn new(fetcher: D, retry: RetryConfig, max_fetches: usize) -> Self {
        Self {
            fetcher,
            caller: Caller::new(retry),
            max_fetches,
        }
    }

    /// Populate descriptions in place for at most `max_fetches` listings.
    ///
    /// Listings that already carry a description don't consume budget.
    /// Returns the number of fetch attempts made.
    pub async fn enrich(&self, listings: &mut [Listing]) -> usize {
        let mut attempts = 0;
        for listing in listings.iter_mut() {
            if !listing.description.is_empty() {
                continue;
            }
            if attempts >= self.max_fetches {
                break;
            }
            attempts += 1;

            match self
                .caller
                .call("fetch_description", || {
                    self.fetcher.fetch_description(listing)
                })
                .await
            {
                Ok(description) => {
                    tracing::debug!(
                        title = %listing.title,
                        bytes = description.len(),
                        "Description fetched"
                    );
                    listing.description = description;
                }
                Err(err) => {
                    // Absorbed: the listing stays in the result set and is
                    // scored from its structural fields alone.
                    tracing::warn!(
                        title = %listing.title,
                        source = %listing.source,
                        error = %err,
                        "Enrichment failed, keeping empty description"
                    );
                }
            }
        }
        attempts
    }
}
