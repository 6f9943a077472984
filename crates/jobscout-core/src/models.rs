use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Whether a job is performed remotely, on site, or a mix of both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobNature {
    Remote,
    Onsite,
    Hybrid,
    #[default]
    Unspecified,
}

impl JobNature {
    /// Map free-text job-type phrases onto the enum via keyword matching.
    ///
    /// Sources describe the same thing many ways ("work from home",
    /// "WFH", "on-site", "in office"); this is the single place those
    /// phrases are interpreted.
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("hybrid") {
            JobNature::Hybrid
        } else if lower.contains("remote")
            || lower.contains("work from home")
            || lower.contains("wfh")
        {
            JobNature::Remote
        } else if lower.contains("onsite")
            || lower.contains("on-site")
            || lower.contains("on site")
            || lower.contains("in office")
        {
            JobNature::Onsite
        } else {
            JobNature::Unspecified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobNature::Remote => "remote",
            JobNature::Onsite => "onsite",
            JobNature::Hybrid => "hybrid",
            JobNature::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for JobNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job-listing provider.
///
/// Ordering of `priority()` matters: direct-API sources win ties over
/// scrape-fallback sources during deduplication and ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    JsearchLinkedin,
    JsearchIndeed,
    GoogleJobs,
    LinkedinScrape,
}

impl Source {
    /// Lower is better. Direct-API sources before scrape fallbacks.
    pub fn priority(&self) -> u8 {
        match self {
            Source::JsearchLinkedin => 0,
            Source::JsearchIndeed => 1,
            Source::GoogleJobs => 2,
            Source::LinkedinScrape => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::JsearchLinkedin => "jsearch_linkedin",
            Source::JsearchIndeed => "jsearch_indeed",
            Source::GoogleJobs => "google_jobs",
            Source::LinkedinScrape => "linkedin_scrape",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-supplied search profile. Immutable for the duration of one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub position: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub salary_range: String,
    #[serde(default)]
    pub job_nature: JobNature,
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl SearchCriteria {
    /// Reject malformed criteria before any network call is made.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.position.trim().is_empty() {
            return Err(AppError::InvalidCriteria("position must not be empty".into()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::InvalidCriteria("location must not be empty".into()));
        }
        Ok(())
    }

    /// Skills lowercased, trimmed, empties dropped. Order preserved.
    pub fn normalized_skills(&self) -> Vec<String> {
        self.skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Source-specific record as returned by an adapter, before normalization.
///
/// One variant per source; only the normalizer looks inside. Every field
/// except the title may be missing.
#[derive(Debug, Clone)]
pub enum RawListing {
    /// JSearch API record (serves both the LinkedIn and Indeed site filters).
    Jsearch {
        source: Source,
        job_title: String,
        employer_name: String,
        job_city: Option<String>,
        job_state: Option<String>,
        job_country: Option<String>,
        job_is_remote: bool,
        work_from_home: bool,
        job_apply_link: Option<String>,
        job_google_link: Option<String>,
        job_id: Option<String>,
        job_description: Option<String>,
        salary: Option<String>,
        experience: Option<String>,
    },
    /// Jobs API v2 record for Google Jobs.
    GoogleJobs {
        title: String,
        company: String,
        location: Option<String>,
        salary: Option<String>,
        url: Option<String>,
        description: Option<String>,
        employment_type: Option<String>,
    },
    /// LinkedIn job-card scraped from the public search page.
    LinkedinScrape {
        title: String,
        company: String,
        location: Option<String>,
        href: Option<String>,
    },
}

impl RawListing {
    pub fn source(&self) -> Source {
        match self {
            RawListing::Jsearch { source, .. } => *source,
            RawListing::GoogleJobs { .. } => Source::GoogleJobs,
            RawListing::LinkedinScrape { .. } => Source::LinkedinScrape,
        }
    }
}

/// Canonical listing record.
///
/// Invariant: `apply_link` is never empty — the normalizer constructs a
/// search-engine fallback URL when the source provides no direct link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_nature: JobNature,
    pub experience: String,
    pub salary: String,
    pub description: String,
    pub apply_link: String,
    pub source: Source,
    /// Source-side identifier, when one exists (used for detail lookups).
    pub job_id: Option<String>,
}

impl Listing {
    /// Normalized (title, company) pair used to collapse duplicates
    /// across sources.
    pub fn dedupe_key(&self) -> String {
        format!(
            "{}::{}",
            normalize_field(&self.title),
            normalize_field(&self.company)
        )
    }

    /// How many optional fields this listing actually carries. Used to pick
    /// the representative within a dedupe group.
    pub fn richness(&self) -> usize {
        let mut n = 0;
        if !self.location.is_empty() {
            n += 1;
        }
        if self.job_nature != JobNature::Unspecified {
            n += 1;
        }
        if !self.experience.is_empty() {
            n += 1;
        }
        if !self.salary.is_empty() {
            n += 1;
        }
        if !self.description.is_empty() {
            n += 1;
        }
        n
    }
}

/// Lowercase and collapse internal whitespace for comparison fields.
pub fn normalize_field(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A listing with its relevance scores attached.
///
/// `final_score` is the sole ranking key. `deep_score` is present only for
/// the top-K listings that went through the oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredListing {
    pub listing: Listing,
    pub prefilter_score: f64,
    pub deep_score: Option<f64>,
    pub skills_match_ratio: f64,
    pub final_score: f64,
}

/// Salary estimate for a title+location pair, from the estimated-salary API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatedSalary {
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub median_salary: Option<f64>,
    pub currency: String,
}

impl EstimatedSalary {
    /// Render the estimate as a display string, median preferred.
    pub fn display(&self) -> Option<String> {
        let fmt = |v: f64| {
            if self.currency == "USD" {
                format!("${v:.2}")
            } else {
                format!("{v:.2} {}", self.currency)
            }
        };
        if let Some(median) = self.median_salary {
            Some(format!("Median: {}", fmt(median)))
        } else {
            match (self.min_salary, self.max_salary) {
                (Some(lo), Some(hi)) => Some(format!("{} - {}", fmt(lo), fmt(hi))),
                (Some(lo), None) => Some(format!("From {}", fmt(lo))),
                (None, Some(hi)) => Some(format!("Up to {}", fmt(hi))),
                (None, None) => None,
            }
        }
    }
}
