pub mod description;
pub mod google_jobs;
pub mod jsearch;
pub mod linkedin_scrape;
pub mod oracle;

pub use description::HttpDescriptionFetcher;
pub use google_jobs::GoogleJobsAdapter;
pub use jsearch::{JsearchAdapter, JsearchClient, SiteFilter};
pub use linkedin_scrape::LinkedinScrapeAdapter;
pub use oracle::OpenAiOracle;
