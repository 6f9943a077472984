use std::time::Duration;

use jobscout_core::error::AppError;
use jobscout_core::experience::ExperienceBand;
use jobscout_core::models::{EstimatedSalary, JobNature, RawListing, SearchCriteria, Source};
use jobscout_core::salary;
use jobscout_core::traits::SourceAdapter;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://jsearch.p.rapidapi.com";
const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the JSearch RapidAPI endpoints: `/search`, `/job-details`,
/// and `/estimated-salary`.
///
/// One client serves both the LinkedIn and Indeed adapters; the site filter
/// decides which publisher the results are restricted to.
#[derive(Clone)]
pub struct JsearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

/// Publisher restriction applied to a JSearch `/search` call. Results whose
/// apply link does not point at the filtered site are discarded, since the
/// `site` parameter is advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteFilter {
    Linkedin,
    Indeed,
}

impl SiteFilter {
    fn domain(self) -> &'static str {
        match self {
            SiteFilter::Linkedin => "linkedin.com",
            SiteFilter::Indeed => "indeed.com",
        }
    }

    fn source(self) -> Source {
        match self {
            SiteFilter::Linkedin => Source::JsearchLinkedin,
            SiteFilter::Indeed => Source::JsearchIndeed,
        }
    }
}

impl JsearchClient {
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

    /// Search for listings restricted to one publisher site.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        site: SiteFilter,
        limit: usize,
    ) -> Result<Vec<RawListing>, AppError> {
        let mut query = if criteria.location.is_empty() {
            criteria.position.clone()
        } else {
            format!("{} in {}", criteria.position, criteria.location)
        };
        if criteria.job_nature == JobNature::Remote {
            query.push_str(" remote");
        }

        let mut params = vec![
            ("query", query),
            ("page", "1".to_string()),
            ("num_pages", "1".to_string()),
            ("site", site.domain().to_string()),
            ("country", "us".to_string()),
        ];

        if let Some((lo, hi)) = salary::parse_user_range(&criteria.salary_range) {
            params.push(("min_salary", format!("{}", lo as u64)));
            params.push(("max_salary", format!("{}", hi as u64)));
        }

        match criteria.job_nature {
            JobNature::Remote => {
                params.push(("remote_jobs_only", "true".to_string()));
                params.push(("work_from_home", "true".to_string()));
            }
            JobNature::Onsite => {
                params.push(("work_from_home", "false".to_string()));
            }
            _ => {}
        }

        let (band, _) = ExperienceBand::from_text(&criteria.experience);
        if band != ExperienceBand::All {
            params.push(("years_of_experience", band.api_code().to_string()));
        }

        let response: SearchResponse = self.get_json("/search", &params).await?;

        let source = site.source();
        let domain = site.domain();
        let experience = (band != ExperienceBand::All).then(|| band.display().to_string());
        let mut listings: Vec<RawListing> = response
            .data
            .into_iter()
            .filter(|job| {
                job.job_apply_link
                    .as_deref()
                    .or(job.job_google_link.as_deref())
                    .is_some_and(|link| link.contains(domain))
            })
            .take(limit)
            .map(|job| {
                let salary = job.salary_text();
                RawListing::Jsearch {
                    source,
                    job_title: job.job_title,
                    employer_name: job.employer_name,
                    job_city: job.job_city,
                    job_state: job.job_state,
                    job_country: job.job_country,
                    job_is_remote: job.job_is_remote,
                    work_from_home: job.work_from_home,
                    job_apply_link: job.job_apply_link,
                    job_google_link: job.job_google_link,
                    job_id: job.job_id,
                    job_description: job.job_description,
                    salary,
                    experience: experience.clone(),
                }
            })
            .collect();

        self.fill_missing_salaries(criteria, band, &mut listings)
            .await;

        tracing::debug!(site = domain, count = listings.len(), "JSearch results kept");
        Ok(listings)
    }

    /// One `/estimated-salary` call per search fills in listings that
    /// advertise no salary of their own. An estimate failure leaves them
    /// as-is; the estimate is nice-to-have.
    async fn fill_missing_salaries(
        &self,
        criteria: &SearchCriteria,
        band: ExperienceBand,
        listings: &mut [RawListing],
    ) {
        let needs_estimate = listings.iter().any(
            |l| matches!(l, RawListing::Jsearch { salary: None, .. }),
        );
        if !needs_estimate {
            return;
        }

        let estimate = match self
            .estimated_salary(&criteria.position, &criteria.location, band)
            .await
        {
            Ok(Some(est)) => est.display(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "salary estimate unavailable");
                None
            }
        };
        let Some(text) = estimate else { return };
        apply_salary_estimate(listings, &text);
    }

    /// Fetch the full description for a listing by its JSearch job id.
    pub async fn job_details(&self, job_id: &str) -> Result<String, AppError> {
        let params = vec![
            ("job_id", job_id.to_string()),
            ("country", "us".to_string()),
        ];
        let response: DetailsResponse = self.get_json("/job-details", &params).await?;

        Ok(response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.job_description)
            .unwrap_or_default())
    }

    /// Salary estimate for a position in a location, used to fill listings
    /// that carry no salary of their own.
    pub async fn estimated_salary(
        &self,
        position: &str,
        location: &str,
        band: ExperienceBand,
    ) -> Result<Option<EstimatedSalary>, AppError> {
        let params = vec![
            ("job_title", position.to_string()),
            ("location", location.to_string()),
            ("location_type", "ANY".to_string()),
            ("years_of_experience", band.api_code().to_string()),
        ];
        let response: SalaryResponse = self.get_json("/estimated-salary", &params).await?;

        Ok(response.data.into_iter().next().map(|d| EstimatedSalary {
            min_salary: d.min_salary,
            max_salary: d.max_salary,
            median_salary: d.median_salary,
            currency: d.salary_currency.unwrap_or_else(|| "USD".to_string()),
        }))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .query(params)
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
                "HTTP {} for {}",
                status.as_u16(),
                path
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse JSearch response: {e}")))
    }
}

/// Fill the salary of every listing that has none with the search-wide
/// estimate. Advertised salaries are never overwritten.
fn apply_salary_estimate(listings: &mut [RawListing], text: &str) {
    for listing in listings.iter_mut() {
        if let RawListing::Jsearch { salary, .. } = listing
            && salary.is_none()
        {
            *salary = Some(text.to_string());
        }
    }
}

// ---- JSearch wire types ----

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<JsearchJob>,
}

#[derive(Deserialize)]
struct JsearchJob {
    #[serde(default)]
    job_title: String,
    #[serde(default)]
    employer_name: String,
    job_city: Option<String>,
    job_state: Option<String>,
    job_country: Option<String>,
    #[serde(default)]
    job_is_remote: bool,
    #[serde(default)]
    work_from_home: bool,
    job_apply_link: Option<String>,
    job_google_link: Option<String>,
    job_id: Option<String>,
    job_description: Option<String>,
    job_min_salary: Option<f64>,
    job_max_salary: Option<f64>,
}

impl JsearchJob {
    /// Advertised salary range, when the posting carries one.
    fn salary_text(&self) -> Option<String> {
        match (self.job_min_salary, self.job_max_salary) {
            (Some(lo), Some(hi)) => Some(format!("{lo} - {hi} a year")),
            (Some(lo), None) => Some(format!("From {lo} a year")),
            (None, Some(hi)) => Some(format!("Up to {hi} a year")),
            (None, None) => None,
        }
    }
}

#[derive(Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    data: Vec<JobDetails>,
}

#[derive(Deserialize)]
struct JobDetails {
    job_description: Option<String>,
}

#[derive(Deserialize)]
struct SalaryResponse {
    #[serde(default)]
    data: Vec<SalaryEstimate>,
}

#[derive(Deserialize)]
struct SalaryEstimate {
    min_salary: Option<f64>,
    max_salary: Option<f64>,
    median_salary: Option<f64>,
    salary_currency: Option<String>,
}

/// Adapter binding a `JsearchClient` to one publisher site.
#[derive(Clone)]
pub struct JsearchAdapter {
    client: JsearchClient,
    site: SiteFilter,
}

impl JsearchAdapter {
    pub fn linkedin(client: JsearchClient) -> Self {
        Self {
            client,
            site: SiteFilter::Linkedin,
        }
    }

    pub fn indeed(client: JsearchClient) -> Self {
        Self {
            client,
            site: SiteFilter::Indeed,
        }
    }
}

impl SourceAdapter for JsearchAdapter {
    fn source(&self) -> Source {
        self.site.source()
    }

    async fn fetch(
        &self,
        criteria: &SearchCriteria,
        limit: usize,
    ) -> Result<Vec<RawListing>, AppError> {
        self.client.search(criteria, self.site, limit).await
    }
}
