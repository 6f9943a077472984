pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod experience;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod retry;
pub mod salary;
pub mod score;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use cache::{ResultCache, fingerprint};
pub use config::SearchConfig;
pub use enrich::Enricher;
pub use error::AppError;
pub use models::{
    EstimatedSalary, JobNature, Listing, RawListing, ScoredListing, SearchCriteria, Source,
};
pub use pipeline::SearchService;
pub use rank::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, clamp_limit};
pub use retry::{Caller, RetryConfig};
pub use score::{Scorer, ScoringWeights};
pub use traits::{DescriptionFetcher, NullDescriptionFetcher, ScoreOracle, SourceAdapter};
