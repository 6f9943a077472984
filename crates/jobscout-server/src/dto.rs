use serde::{Deserialize, Serialize};

use jobscout_core::models::{JobNature, ScoredListing, SearchCriteria};

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SearchRequest {
    pub position: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub salary: String,
    /// "remote" | "onsite" | "hybrid"; anything else means no preference.
    #[serde(default, rename = "jobNature")]
    pub job_nature: String,
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl SearchRequest {
    pub fn into_criteria(self) -> SearchCriteria {
        SearchCriteria {
            position: self.position,
            experience: self.experience,
            salary_range: self.salary,
            job_nature: JobNature::from_text(&self.job_nature),
            location: self.location,
            skills: self.skills,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Maximum number of results (1 to 5, default 3).
    pub limit: Option<usize>,
}

/// One relevant job as presented to the caller. Internal scoring fields are
/// deliberately absent.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JobResponse {
    pub job_title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "jobNature")]
    pub job_nature: String,
    pub experience: String,
    pub salary: String,
    pub apply_link: String,
}

impl From<ScoredListing> for JobResponse {
    fn from(scored: ScoredListing) -> Self {
        let listing = scored.listing;
        Self {
            job_title: listing.title,
            company: listing.company,
            location: listing.location,
            job_nature: listing.job_nature.to_string(),
            experience: listing.experience,
            salary: listing.salary,
            apply_link: listing.apply_link,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SearchResponse {
    pub relevant_jobs: Vec<JobResponse>,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
