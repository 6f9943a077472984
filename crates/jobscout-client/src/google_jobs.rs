use std::time::Duration;

use jobscout_core::error::AppError;
use jobscout_core::models::{JobNature, RawListing, SearchCriteria, Source};
use jobscout_core::salary;
use jobscout_core::traits::SourceAdapter;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://jobs-api14.p.rapidapi.com";
const RAPIDAPI_HOST: &str = "jobs-api14.p.rapidapi.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_EMPLOYMENT_TYPES: &str = "fulltime;parttime;intern;contractor";

/// Adapter for Google Jobs results via the Jobs API `/v2/list` endpoint.
///
/// Listings outside the user's salary range are dropped here, before
/// normalization, since the API cannot filter on salary itself.
#[derive(Clone)]
pub struct GoogleJobsAdapter {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl GoogleJobsAdapter {
    pub fn new(api_key: &str) -> Result<Self, AppError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        })
    }
}

impl SourceAdapter for GoogleJobsAdapter {
    fn source(&self) -> Source {
        Source::GoogleJobs
    }

    async fn fetch(
        &self,
        criteria: &SearchCriteria,
        limit: usize,
    ) -> Result<Vec<RawListing>, AppError> {
        let location = if criteria.location.is_empty() {
            "United States".to_string()
        } else {
            criteria.location.clone()
        };
        let remote_only = criteria.job_nature == JobNature::Remote;

        let params = [
            ("query", criteria.position.clone()),
            ("location", location),
            ("autoTranslateLocation", "true".to_string()),
            ("remoteOnly", remote_only.to_string()),
            ("employmentTypes", DEFAULT_EMPLOYMENT_TYPES.to_string()),
        ];

        let url = format!("{}/v2/list", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    AppError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for /v2/list",
                status.as_u16()
            )));
        }

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse Jobs API response: {e}")))?;

        let user_range = salary::parse_user_range(&criteria.salary_range);
        let listings: Vec<RawListing> = body
            .jobs
            .into_iter()
            .filter_map(|job| {
                let salary_text = job.salary_text();
                if let (Some((lo, hi)), Some(text)) = (user_range, salary_text.as_deref())
                    && !salary::salary_in_range(text, lo, hi)
                {
                    return None;
                }
                let location = job.location_text();
                Some(RawListing::GoogleJobs {
                    title: job.title,
                    company: job.company,
                    location,
                    salary: salary_text,
                    url: job.url,
                    description: job.description,
                    employment_type: job.employment_type,
                })
            })
            .take(limit)
            .collect();

        tracing::debug!(count = listings.len(), "Google Jobs results kept");
        Ok(listings)
    }
}

// ---- Jobs API wire types ----

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    jobs: Vec<GoogleJob>,
}

#[derive(Deserialize)]
struct GoogleJob {
    #[serde(default)]
    title: String,
    #[serde(default)]
    company: String,
    location: Option<String>,
    city: Option<String>,
    country: Option<String>,
    description: Option<String>,
    url: Option<String>,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    salary_currency: Option<String>,
    salary: Option<String>,
    #[serde(rename = "salaryRange")]
    salary_range: Option<String>,
    #[serde(rename = "employmentType")]
    employment_type: Option<String>,
}

impl GoogleJob {
    /// Best-available salary rendering: structured min/max first, then the
    /// free-text fields.
    fn salary_text(&self) -> Option<String> {
        let currency = self.salary_currency.as_deref().unwrap_or("USD");
        match (self.salary_min, self.salary_max) {
            (Some(lo), Some(hi)) => Some(format!("{lo} - {hi} {currency}")),
            (Some(lo), None) => Some(format!("{lo} {currency}")),
            _ => self
                .salary
                .clone()
                .or_else(|| self.salary_range.clone())
                .filter(|s| !s.is_empty()),
        }
    }

    fn location_text(&self) -> Option<String> {
        if let Some(loc) = &self.location
            && !loc.is_empty()
        {
            return Some(loc.clone());
        }
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            _ => None,
        }
    }
}
