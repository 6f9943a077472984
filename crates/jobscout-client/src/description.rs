use std::time::Duration;

use jobscout_core::error::AppError;
use jobscout_core::models::{Listing, Source};
use jobscout_core::traits::DescriptionFetcher;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::jsearch::JsearchClient;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Fills in missing job descriptions for the top-ranked candidates.
///
/// Listings that came through JSearch carry a job id and use the
/// `/job-details` endpoint; everything else falls back to fetching the
/// posting page and extracting the description container.
#[derive(Clone)]
pub struct HttpDescriptionFetcher {
    jsearch: JsearchClient,
    client: Client,
    timeout_secs: u64,
}

impl HttpDescriptionFetcher {
    pub fn new(jsearch: JsearchClient) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            jsearch,
            client,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String, AppError> {
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
        if !status.is_success() {
            return Err(AppError::EnrichmentFailed(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }
}

impl DescriptionFetcher for HttpDescriptionFetcher {
    async fn fetch_description(&self, listing: &Listing) -> Result<String, AppError> {
        if let Some(job_id) = &listing.job_id
            && matches!(
                listing.source,
                Source::JsearchLinkedin | Source::JsearchIndeed
            )
        {
            return self.jsearch.job_details(job_id).await;
        }

        if listing.apply_link.is_empty() {
            return Ok(String::new());
        }

        let html = self.fetch_page(&listing.apply_link).await?;
        Ok(extract_description(&html)?.unwrap_or_default())
    }
}

/// Pull the description text out of a posting page. Tries the LinkedIn
/// container first, then Indeed's.
fn extract_description(html: &str) -> Result<Option<String>, AppError> {
    let linkedin = selector("div.description__text")?;
    let indeed = selector("div#jobDescriptionText")?;

    let document = Html::parse_document(html);
    let text = document
        .select(&linkedin)
        .next()
        .or_else(|| document.select(&indeed).next())
        .map(|e| e.text().collect::<String>().trim().to_string());

    Ok(text.filter(|t| !t.is_empty()))
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::Generic(format!("Invalid selector {css}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_linkedin_description_container() {
        let html = r#"<div class="description__text"> Build APIs with Django. </div>"#;
        let text = extract_description(html).unwrap().unwrap();
        assert_eq!(text, "Build APIs with Django.");
    }

    #[test]
    fn extracts_indeed_description_container() {
        let html = r#"<div id="jobDescriptionText">Ship Python services.</div>"#;
        let text = extract_description(html).unwrap().unwrap();
        assert_eq!(text, "Ship Python services.");
    }

    #[test]
    fn missing_container_yields_none() {
        let html = "<html><body><p>nothing here</p></body></html>";
        assert!(extract_description(html).unwrap().is_none());
    }
}
