//! The aggregation → enrichment → scoring pipeline.
//!
//! Orchestrates one search request: sources are fetched concurrently (each
//! behind its own timeout and retry budget), merged and deduplicated,
//! prefilter-scored, selectively enriched, deep-scored for the top-K
//! candidates, and ranked into a stable order. Generic over all external
//! dependencies via traits, enabling dependency injection and testability
//! without real HTTP or oracle calls.

use std::cmp::Ordering;

use crate::cache::{ResultCache, fingerprint};
use crate::config::SearchConfig;
use crate::enrich::Enricher;
use crate::error::AppError;
use crate::models::{Listing, RawListing, ScoredListing, SearchCriteria};
use crate::normalize::normalize_all;
use crate::rank::{clamp_limit, rank};
use crate::retry::Caller;
use crate::score::{Scorer, prefilter_score};
use crate::traits::{DescriptionFetcher, ScoreOracle, SourceAdapter};

/// Outcome of one source's fetch attempt. A failed or timed-out source
/// contributes zero listings; the distinction only matters for deciding
/// whether *every* source failed.
enum SourceOutcome {
    Listings(Vec<RawListing>),
    Failed,
}

pub struct SearchService<LA, LS, IN, GJ, D, O>
where
    LA: SourceAdapter,
    LS: SourceAdapter,
    IN: SourceAdapter,
    GJ: SourceAdapter,
    D: DescriptionFetcher,
    O: ScoreOracle,
{
    linkedin_api: LA,
    linkedin_scrape: LS,
    indeed: IN,
    google_jobs: GJ,
    enricher: Enricher<D>,
    scorer: Scorer<O>,
    cache: Option<ResultCache>,
    config: SearchConfig,
}

impl<LA, LS, IN, GJ, D, O> SearchService<LA, LS, IN, GJ, D, O>
where
    LA: SourceAdapter,
    LS: SourceAdapter,
    IN: SourceAdapter,
    GJ: SourceAdapter,
    D: DescriptionFetcher,
    O: ScoreOracle,
{
    pub fn new(
        linkedin_api: LA,
        linkedin_scrape: LS,
        indeed: IN,
        google_jobs: GJ,
        description_fetcher: D,
        oracle: O,
        config: SearchConfig,
    ) -> Self {
        let enricher = Enricher::new(description_fetcher, config.retry.clone(), config.top_k);
        let scorer = Scorer::new(oracle, config.retry.clone(), config.weights.clone());
        Self {
            linkedin_api,
            linkedin_scrape,
            indeed,
            google_jobs,
            enricher,
            scorer,
            cache: None,
            config,
        }
    }

    /// Attach a result cache, consulted before any network call and written
    /// only by successfully completed searches.
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Run one search end to end.
    ///
    /// Fails only on invalid criteria (checked before any network work) or
    /// when every source failed; all per-source and per-listing failures
    /// degrade gracefully.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        limit: usize,
    ) -> Result<Vec<ScoredListing>, AppError> {
        criteria.validate()?;
        let limit = clamp_limit(limit);

        let key = fingerprint(criteria, limit);
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(&key).await
        {
            tracing::info!(fingerprint = %&key[..8], "Result cache hit");
            return Ok((*hit).clone());
        }

        // Fetch phase: independent sources run concurrently, each behind its
        // own timeout. LinkedIn is a two-state policy: API first, scrape as
        // a substitute on empty or failure.
        let (linkedin, indeed, google) = tokio::join!(
            self.fetch_linkedin(criteria),
            self.fetch_source(&self.indeed, criteria),
            self.fetch_source(&self.google_jobs, criteria),
        );

        let outcomes = [linkedin, indeed, google];
        if outcomes
            .iter()
            .all(|o| matches!(o, SourceOutcome::Failed))
        {
            tracing::error!("Every source failed; nothing to rank");
            return Err(AppError::AllSourcesFailed);
        }

        let raws: Vec<RawListing> = outcomes
            .into_iter()
            .flat_map(|o| match o {
                SourceOutcome::Listings(l) => l,
                SourceOutcome::Failed => vec![],
            })
            .collect();

        let listings = normalize_all(raws);
        tracing::info!(count = listings.len(), "Normalized and deduplicated");
        if listings.is_empty() {
            return Ok(vec![]);
        }

        // Tier 1: prefilter everything, order best-first.
        let mut prefiltered: Vec<(f64, Listing)> = listings
            .into_iter()
            .map(|l| (prefilter_score(&l, criteria, self.scorer.weights()), l))
            .collect();
        prefiltered.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let k = self.config.top_k.min(prefiltered.len());
        let scores: Vec<f64> = prefiltered.iter().map(|p| p.0).collect();
        let mut ordered: Vec<Listing> = prefiltered.into_iter().map(|p| p.1).collect();

        // Enrichment and Tier 2 are both bounded to the top-K candidates.
        self.enricher.enrich(&mut ordered[..k]).await;

        let mut scored = Vec::with_capacity(ordered.len());
        for (idx, listing) in ordered.into_iter().enumerate() {
            let deep = if idx < k {
                match self.scorer.deep_score(&listing, criteria).await {
                    Ok(score) => Some(score),
                    Err(err) => {
                        tracing::warn!(
                            title = %listing.title,
                            error = %err,
                            "Deep scoring failed, degrading to prefilter score"
                        );
                        None
                    }
                }
            } else {
                None
            };
            scored.push(self.scorer.finalize(listing, scores[idx], deep, criteria));
        }

        let ranked = rank(scored, limit);

        if let Some(cache) = &self.cache {
            cache.put(key, ranked.clone()).await;
        }

        Ok(ranked)
    }

    /// Fetch one source behind retry and a hard timeout. A slow or failing
    /// source never stalls or fails the request.
    async fn fetch_source<A: SourceAdapter>(
        &self,
        adapter: &A,
        criteria: &SearchCriteria,
    ) -> SourceOutcome {
        let source = adapter.source();
        let caller = Caller::new(self.config.retry.clone());
        let fetch = caller.call(source.as_str(), || {
            adapter.fetch(criteria, self.config.per_source_limit)
        });

        match tokio::time::timeout(self.config.source_timeout, fetch).await {
            Ok(Ok(listings)) => {
                tracing::info!(source = %source, count = listings.len(), "Source fetch complete");
                SourceOutcome::Listings(listings)
            }
            Ok(Err(err)) => {
                tracing::warn!(source = %source, error = %err, "Source unavailable, skipping");
                SourceOutcome::Failed
            }
            Err(_) => {
                tracing::warn!(
                    source = %source,
                    timeout_secs = self.config.source_timeout.as_secs(),
                    "Source fetch timed out, treating as empty"
                );
                SourceOutcome::Failed
            }
        }
    }

    /// Two-state LinkedIn policy: `Attempting(api)` → on empty/failure →
    /// `Attempting(scrape)` → terminal. The scrape substitutes for the API
    /// result; the two are never merged within one request.
    async fn fetch_linkedin(&self, criteria: &SearchCriteria) -> SourceOutcome {
        match self.fetch_source(&self.linkedin_api, criteria).await {
            SourceOutcome::Listings(listings) if !listings.is_empty() => {
                SourceOutcome::Listings(listings)
            }
            SourceOutcome::Listings(_) => {
                tracing::info!("LinkedIn API returned nothing, trying scrape fallback");
                self.fetch_source(&self.linkedin_scrape, criteria).await
            }
            SourceOutcome::Failed => {
                tracing::info!("LinkedIn API failed, trying scrape fallback");
                match self.fetch_source(&self.linkedin_scrape, criteria).await {
                    SourceOutcome::Listings(listings) => SourceOutcome::Listings(listings),
                    // Both states failed: the source as a whole failed.
                    SourceOutcome::Failed => SourceOutcome::Failed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::{JobNature, Source};
    use crate::retry::RetryConfig;
    use crate::testutil::{
        MockAdapter, MockDescriptionFetcher, MockOracle, jsearch_listing, scrape_listing,
    };

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            position: "Backend Developer".into(),
            experience: String::new(),
            salary_range: String::new(),
            job_nature: JobNature::Remote,
            location: "usa".into(),
            skills: vec!["Python".into(), "Django".into()],
        }
    }

    fn fast_config() -> SearchConfig {
        SearchConfig {
            retry: RetryConfig {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
            },
            ..SearchConfig::default()
        }
    }

    type MockService = SearchService<
        MockAdapter,
        MockAdapter,
        MockAdapter,
        MockAdapter,
        MockDescriptionFetcher,
        MockOracle,
    >;

    fn service(
        linkedin_api: MockAdapter,
        linkedin_scrape: MockAdapter,
        indeed: MockAdapter,
        google: MockAdapter,
        oracle: MockOracle,
        config: SearchConfig,
    ) -> MockService {
        SearchService::new(
            linkedin_api,
            linkedin_scrape,
            indeed,
            google,
            MockDescriptionFetcher::new("Python and Django daily."),
            oracle,
            config,
        )
    }

    fn five_varied_listings() -> Vec<RawListing> {
        vec![
            // Matches position keyword, location, and both skills in title.
            jsearch_listing("Backend Developer Python Django", "Alpha", ""),
            jsearch_listing("Backend Developer", "Beta", "We use Python."),
            jsearch_listing("Frontend Developer", "Gamma", "React shop"),
            jsearch_listing("Backend Developer", "Delta", ""),
            jsearch_listing("Data Analyst", "Epsilon", "SQL, Excel"),
        ]
    }

    #[tokio::test]
    async fn scenario_ranked_search_returns_limit_with_best_first() {
        let svc = service(
            MockAdapter::new(Source::JsearchLinkedin, five_varied_listings()),
            MockAdapter::empty(Source::LinkedinScrape),
            MockAdapter::empty(Source::JsearchIndeed),
            MockAdapter::empty(Source::GoogleJobs),
            MockOracle::new(0.5),
            fast_config(),
        );

        let results = svc.search(&criteria(), 3).await.unwrap();

        assert_eq!(results.len(), 3);
        // Descending final score.
        for pair in results.windows(2) {
            assert!(pair[0].final_score >= pair[1].final_score);
        }
        // The listing matching position, location, and both skills in the
        // title ranks first.
        assert_eq!(results[0].listing.company, "Alpha");
        assert_eq!(results[0].skills_match_ratio, 1.0);
    }

    #[tokio::test]
    async fn all_sources_failed_is_an_error_not_empty_success() {
        let svc = service(
            MockAdapter::with_error(
                Source::JsearchLinkedin,
                AppError::HttpError("HTTP 500".into()),
            ),
            MockAdapter::with_error(
                Source::LinkedinScrape,
                AppError::HttpError("HTTP 500".into()),
            ),
            MockAdapter::with_error(
                Source::JsearchIndeed,
                AppError::HttpError("HTTP 403".into()),
            ),
            MockAdapter::with_error(Source::GoogleJobs, AppError::HttpError("HTTP 500".into())),
            MockOracle::new(0.5),
            fast_config(),
        );

        let err = svc.search(&criteria(), 3).await.unwrap_err();
        assert!(matches!(err, AppError::AllSourcesFailed));
    }

    #[tokio::test]
    async fn one_failing_source_degrades_gracefully() {
        let svc = service(
            MockAdapter::with_error(
                Source::JsearchLinkedin,
                AppError::HttpError("HTTP 502".into()),
            ),
            MockAdapter::with_error(
                Source::LinkedinScrape,
                AppError::HttpError("HTTP 502".into()),
            ),
            MockAdapter::new(
                Source::JsearchIndeed,
                vec![
                    jsearch_listing("Backend Developer", "Solo", "Python"),
                    jsearch_listing("Backend Engineer", "Duo", "Django"),
                ],
            ),
            MockAdapter::empty(Source::GoogleJobs),
            MockOracle::new(0.5),
            fast_config(),
        );

        let results = svc.search(&criteria(), 3).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn empty_sources_give_empty_success() {
        let svc = service(
            MockAdapter::empty(Source::JsearchLinkedin),
            MockAdapter::empty(Source::LinkedinScrape),
            MockAdapter::empty(Source::JsearchIndeed),
            MockAdapter::empty(Source::GoogleJobs),
            MockOracle::new(0.5),
            fast_config(),
        );

        let results = svc.search(&criteria(), 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn invalid_criteria_rejected_before_any_fetch() {
        let linkedin = MockAdapter::empty(Source::JsearchLinkedin);
        let svc = service(
            linkedin.clone(),
            MockAdapter::empty(Source::LinkedinScrape),
            MockAdapter::empty(Source::JsearchIndeed),
            MockAdapter::empty(Source::GoogleJobs),
            MockOracle::new(0.5),
            fast_config(),
        );

        let mut bad = criteria();
        bad.position = String::new();
        let err = svc.search(&bad, 3).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCriteria(_)));
        assert_eq!(linkedin.calls(), 0);
    }

    #[tokio::test]
    async fn linkedin_scrape_substitutes_when_api_empty() {
        let scrape = MockAdapter::new(
            Source::LinkedinScrape,
            vec![scrape_listing("Backend Developer", "ScrapeCo")],
        );
        let svc = service(
            MockAdapter::empty(Source::JsearchLinkedin),
            scrape.clone(),
            MockAdapter::empty(Source::JsearchIndeed),
            MockAdapter::empty(Source::GoogleJobs),
            MockOracle::new(0.5),
            fast_config(),
        );

        let results = svc.search(&criteria(), 3).await.unwrap();
        assert_eq!(scrape.calls(), 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].listing.source, Source::LinkedinScrape);
    }

    #[tokio::test]
    async fn linkedin_scrape_not_called_when_api_has_results() {
        let scrape = MockAdapter::new(
            Source::LinkedinScrape,
            vec![scrape_listing("Other Job", "ScrapeCo")],
        );
        let svc = service(
            MockAdapter::new(
                Source::JsearchLinkedin,
                vec![jsearch_listing("Backend Developer", "ApiCo", "")],
            ),
            scrape.clone(),
            MockAdapter::empty(Source::JsearchIndeed),
            MockAdapter::empty(Source::GoogleJobs),
            MockOracle::new(0.5),
            fast_config(),
        );

        let results = svc.search(&criteria(), 3).await.unwrap();
        assert_eq!(scrape.calls(), 0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].listing.source, Source::JsearchLinkedin);
    }

    #[tokio::test]
    async fn duplicates_across_sources_collapse() {
        let svc = service(
            MockAdapter::new(
                Source::JsearchLinkedin,
                vec![jsearch_listing("Backend Developer", "ACME", "Python")],
            ),
            MockAdapter::empty(Source::LinkedinScrape),
            MockAdapter::new(
                Source::JsearchIndeed,
                vec![jsearch_listing("backend developer", "acme", "")],
            ),
            MockAdapter::empty(Source::GoogleJobs),
            MockOracle::new(0.5),
            fast_config(),
        );

        let results = svc.search(&criteria(), 5).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn oracle_calls_and_enrichment_bounded_to_top_k() {
        let many: Vec<RawListing> = (0..8)
            .map(|i| {
                RawListing::LinkedinScrape {
                    title: format!("Backend Developer {i}"),
                    company: format!("Company {i}"),
                    location: Some("usa".into()),
                    href: Some(format!("https://linkedin.com/jobs/{i}")),
                }
            })
            .collect();

        let oracle = MockOracle::new(0.5);
        let fetcher = MockDescriptionFetcher::new("desc");
        let config = SearchConfig {
            top_k: 2,
            ..fast_config()
        };
        let svc = SearchService::new(
            MockAdapter::new(Source::JsearchLinkedin, many),
            MockAdapter::empty(Source::LinkedinScrape),
            MockAdapter::empty(Source::JsearchIndeed),
            MockAdapter::empty(Source::GoogleJobs),
            fetcher.clone(),
            oracle.clone(),
            config,
        );

        let results = svc.search(&criteria(), 5).await.unwrap();

        // Exactly K description fetches and K oracle calls, regardless of M.
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(oracle.calls(), 2);
        // Deep scores exist only where a prefilter score does too, and only
        // for the top-K subset.
        let deep_count = results.iter().filter(|s| s.deep_score.is_some()).count();
        assert!(deep_count <= 2);
    }

    #[tokio::test]
    async fn oracle_failure_degrades_listing_not_request() {
        // First oracle call (top prefilter candidate) fails; the rest default.
        let oracle = MockOracle::with_responses(vec![
            Err(AppError::HttpError("HTTP 400".into())),
            Ok(0.4),
            Ok(0.4),
            Ok(0.4),
            Ok(0.4),
        ]);
        let svc = service(
            MockAdapter::new(Source::JsearchLinkedin, five_varied_listings()),
            MockAdapter::empty(Source::LinkedinScrape),
            MockAdapter::empty(Source::JsearchIndeed),
            MockAdapter::empty(Source::GoogleJobs),
            oracle,
            fast_config(),
        );

        let results = svc.search(&criteria(), 5).await.unwrap();
        assert_eq!(results.len(), 5);

        // The degraded listing is still present, scored without a deep score.
        let alpha = results
            .iter()
            .find(|s| s.listing.company == "Alpha")
            .expect("degraded listing must remain in the result set");
        assert!(alpha.deep_score.is_none());
        assert!(alpha.prefilter_score > 0.0);
    }

    #[tokio::test]
    async fn identical_requests_are_idempotent() {
        let make_svc = || {
            service(
                MockAdapter::with_responses(
                    Source::JsearchLinkedin,
                    vec![Ok(five_varied_listings()), Ok(five_varied_listings())],
                ),
                MockAdapter::empty(Source::LinkedinScrape),
                MockAdapter::empty(Source::JsearchIndeed),
                MockAdapter::empty(Source::GoogleJobs),
                MockOracle::new(0.5),
                fast_config(),
            )
        };

        let svc = make_svc();
        let first = svc.search(&criteria(), 3).await.unwrap();
        let second = svc.search(&criteria(), 3).await.unwrap();

        let order = |r: &[ScoredListing]| {
            r.iter()
                .map(|s| s.listing.company.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(order(&first), order(&second));
    }

    #[tokio::test]
    async fn cache_short_circuits_repeat_searches() {
        let linkedin = MockAdapter::new(Source::JsearchLinkedin, five_varied_listings());
        let svc = service(
            linkedin.clone(),
            MockAdapter::empty(Source::LinkedinScrape),
            MockAdapter::empty(Source::JsearchIndeed),
            MockAdapter::empty(Source::GoogleJobs),
            MockOracle::new(0.5),
            fast_config(),
        )
        .with_cache(ResultCache::new(16, Duration::from_secs(60)));

        let first = svc.search(&criteria(), 3).await.unwrap();
        let second = svc.search(&criteria(), 3).await.unwrap();

        assert_eq!(linkedin.calls(), 1);
        assert_eq!(first.len(), second.len());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_is_skipped_not_awaited_forever() {
        #[derive(Clone)]
        struct SlowAdapter;
        impl SourceAdapter for SlowAdapter {
            fn source(&self) -> Source {
                Source::GoogleJobs
            }
            async fn fetch(
                &self,
                _criteria: &SearchCriteria,
                _limit: usize,
            ) -> Result<Vec<RawListing>, AppError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(vec![])
            }
        }

        let svc = SearchService::new(
            MockAdapter::new(
                Source::JsearchLinkedin,
                vec![jsearch_listing("Backend Developer", "FastCo", "")],
            ),
            MockAdapter::empty(Source::LinkedinScrape),
            MockAdapter::empty(Source::JsearchIndeed),
            SlowAdapter,
            MockDescriptionFetcher::new("desc"),
            MockOracle::new(0.5),
            fast_config(),
        );

        let results = svc.search(&criteria(), 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].listing.company, "FastCo");
    }
}
