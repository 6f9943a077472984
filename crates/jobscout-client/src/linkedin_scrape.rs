use std::time::Duration;

use jobscout_core::error::AppError;
use jobscout_core::models::{JobNature, RawListing, SearchCriteria, Source};
use jobscout_core::traits::SourceAdapter;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

const SEARCH_URL: &str = "https://www.linkedin.com/jobs/search/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
// LinkedIn serves a bot-check page to unrecognized clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Fallback adapter scraping the public LinkedIn job-search page.
///
/// Used as a substitute when the JSearch LinkedIn adapter errors or returns
/// nothing. Yields sparse listings (no salary, experience, or description);
/// descriptions are filled later by the enricher.
#[derive(Clone)]
pub struct LinkedinScrapeAdapter {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl LinkedinScrapeAdapter {
    pub fn new() -> Result<Self, AppError> {
        Self::with_base_url(SEARCH_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        })
    }

    fn search_url(&self, criteria: &SearchCriteria) -> Result<Url, AppError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;
        let keywords = if criteria.location.is_empty() {
            criteria.position.clone()
        } else {
            format!("{} {}", criteria.position, criteria.location)
        };
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("keywords", &keywords);
            if criteria.job_nature == JobNature::Remote {
                // LinkedIn's workplace-type filter: 2 = remote.
                pairs.append_pair("f_WT", "2");
            }
        }
        Ok(url)
    }
}

impl SourceAdapter for LinkedinScrapeAdapter {
    fn source(&self) -> Source {
        Source::LinkedinScrape
    }

    async fn fetch(
        &self,
        criteria: &SearchCriteria,
        limit: usize,
    ) -> Result<Vec<RawListing>, AppError> {
        let url = self.search_url(criteria)?;
        let response = self.client.get(url).send().await.map_err(|e| {
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
                "HTTP {} from LinkedIn search page",
                status.as_u16()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        // `Html` is !Send; parsing stays inside this sync call.
        let listings = parse_job_cards(&html, limit)?;
        tracing::debug!(count = listings.len(), "LinkedIn scrape results");
        Ok(listings)
    }
}

/// Extract job cards from the public search page markup.
fn parse_job_cards(html: &str, limit: usize) -> Result<Vec<RawListing>, AppError> {
    let card = selector("div.base-card")?;
    let title = selector(".base-search-card__title")?;
    let company = selector(".base-search-card__subtitle")?;
    let location = selector(".job-search-card__location")?;
    let link = selector("a.base-card__full-link")?;

    let document = Html::parse_document(html);
    let mut listings = Vec::new();
    for element in document.select(&card).take(limit) {
        let Some(title_text) = element.select(&title).next().map(text_of) else {
            continue;
        };
        let Some(company_text) = element.select(&company).next().map(text_of) else {
            continue;
        };
        let href = element
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);
        if href.is_none() {
            continue;
        }

        listings.push(RawListing::LinkedinScrape {
            title: title_text,
            company: company_text,
            location: element.select(&location).next().map(text_of),
            href,
        });
    }

    Ok(listings)
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::Generic(format!("Invalid selector {css}: {e}")))
}

fn text_of(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
