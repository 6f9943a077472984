use futures::future::BoxFuture;

use jobscout_core::error::AppError;
use jobscout_core::models::{ScoredListing, SearchCriteria};
use jobscout_core::pipeline::SearchService;
use jobscout_core::traits::{DescriptionFetcher, ScoreOracle, SourceAdapter};

/// Object-safe view of the search pipeline, so route handlers stay
/// non-generic. Implemented for every `SearchService` instantiation.
pub trait SearchBackend: Send + Sync {
    fn search(
        &self,
        criteria: SearchCriteria,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<ScoredListing>, AppError>>;
}

impl<LA, LS, IN, GJ, D, O> SearchBackend for SearchService<LA, LS, IN, GJ, D, O>
where
    LA: SourceAdapter,
    LS: SourceAdapter,
    IN: SourceAdapter,
    GJ: SourceAdapter,
    D: DescriptionFetcher,
    O: ScoreOracle,
{
    fn search(
        &self,
        criteria: SearchCriteria,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<ScoredListing>, AppError>> {
        Box::pin(async move { SearchService::search(self, &criteria, limit).await })
    }
}

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub backend: Box<dyn SearchBackend>,
}

impl AppState {
    pub fn new(backend: impl SearchBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }
}
