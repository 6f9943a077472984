//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{Listing, RawListing, SearchCriteria, Source};
use crate::traits::{DescriptionFetcher, ScoreOracle, SourceAdapter};

// ---------------------------------------------------------------------------
// MockAdapter
// ---------------------------------------------------------------------------

/// Mock source adapter with a queue of responses. Each call pops the first
/// element; an empty queue yields an empty listing set.
#[derive(Clone)]
pub struct MockAdapter {
    source: Source,
    responses: Arc<Mutex<Vec<Result<Vec<RawListing>, AppError>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockAdapter {
    pub fn new(source: Source, listings: Vec<RawListing>) -> Self {
        Self {
            source,
            responses: Arc::new(Mutex::new(vec![Ok(listings)])),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn empty(source: Source) -> Self {
        Self::new(source, vec![])
    }

    pub fn with_error(source: Source, error: AppError) -> Self {
        Self {
            source,
            responses: Arc::new(Mutex::new(vec![Err(error)])),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_responses(
        source: Source,
        responses: Vec<Result<Vec<RawListing>, AppError>>,
    ) -> Self {
        Self {
            source,
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SourceAdapter for MockAdapter {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(
        &self,
        _criteria: &SearchCriteria,
        _limit: usize,
    ) -> Result<Vec<RawListing>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(vec![])
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockDescriptionFetcher
// ---------------------------------------------------------------------------

/// Mock description fetcher returning a fixed text or error.
#[derive(Clone)]
pub struct MockDescriptionFetcher {
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    default: String,
    calls: Arc<AtomicUsize>,
}

impl MockDescriptionFetcher {
    pub fn new(text: &str) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![])),
            default: text.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Err(error)])),
            default: String::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DescriptionFetcher for MockDescriptionFetcher {
    async fn fetch_description(&self, _listing: &Listing) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default.clone())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockOracle
// ---------------------------------------------------------------------------

/// Mock scoring oracle. A fixed score by default; a response queue when
/// per-call behavior matters.
#[derive(Clone)]
pub struct MockOracle {
    responses: Arc<Mutex<Vec<Result<f64, AppError>>>>,
    default: f64,
    calls: Arc<AtomicUsize>,
    /// Prompts the oracle was asked to score, newest last.
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockOracle {
    pub fn new(score: f64) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![])),
            default: score,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Err(error)])),
            default: 0.0,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn with_responses(responses: Vec<Result<f64, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            default: 0.0,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScoreOracle for MockOracle {
    async fn score(&self, prompt: &str) -> Result<f64, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default)
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Listing builders
// ---------------------------------------------------------------------------

/// JSearch raw listing with the fields most tests care about.
pub fn jsearch_listing(title: &str, company: &str, description: &str) -> RawListing {
    RawListing::Jsearch {
        source: Source::JsearchLinkedin,
        job_title: title.to_string(),
        employer_name: company.to_string(),
        job_city: Some("Austin".into()),
        job_state: Some("TX".into()),
        job_country: Some("USA".into()),
        job_is_remote: true,
        work_from_home: false,
        job_apply_link: Some(format!(
            "https://linkedin.com/jobs/{}",
            title.to_lowercase().replace(' ', "-")
        )),
        job_google_link: None,
        job_id: Some(format!("{title}-{company}")),
        job_description: if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        },
        salary: None,
        experience: None,
    }
}

/// Scraped LinkedIn card (title/company/href only).
pub fn scrape_listing(title: &str, company: &str) -> RawListing {
    RawListing::LinkedinScrape {
        title: title.to_string(),
        company: company.to_string(),
        location: Some("usa".into()),
        href: Some("https://linkedin.com/jobs/view/1".into()),
    }
}
