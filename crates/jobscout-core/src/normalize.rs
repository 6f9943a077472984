//! Converts heterogeneous source records into canonical [`Listing`]s and
//! collapses duplicates across sources.
//!
//! This module is the single place source-specific knowledge lives; nothing
//! downstream of it ever looks at a [`RawListing`] again.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::models::{JobNature, Listing, RawListing, Source};

/// Convert one raw record into a canonical listing.
///
/// Comparison fields are trimmed; missing `experience`/`salary` become empty
/// strings (never null) so downstream formatting is uniform; `apply_link`
/// always ends up non-empty.
pub fn normalize(raw: RawListing) -> Listing {
    match raw {
        RawListing::Jsearch {
            source,
            job_title,
            employer_name,
            job_city,
            job_state,
            job_country,
            job_is_remote,
            work_from_home,
            job_apply_link,
            job_google_link,
            job_id,
            job_description,
            salary,
            experience,
        } => {
            let title = job_title.trim().to_string();
            let company = employer_name.trim().to_string();
            let location = join_location(job_city, job_state, job_country);
            let description = job_description.unwrap_or_default();

            // The API reports remoteness as flags; keyword hints in the
            // title or the head of the description override a false flag,
            // since the flags are frequently wrong for aggregated postings.
            let job_nature = if job_is_remote || work_from_home {
                JobNature::Remote
            } else {
                infer_nature(&title, &description, JobNature::Onsite)
            };

            let apply_link = job_apply_link
                .filter(|l| !l.is_empty())
                .or(job_google_link.filter(|l| !l.is_empty()))
                .unwrap_or_else(|| fallback_apply_link(&title, &company));

            Listing {
                title,
                company,
                location,
                job_nature,
                experience: experience.unwrap_or_default(),
                salary: salary.unwrap_or_default(),
                description,
                apply_link,
                source,
                job_id,
            }
        }
        RawListing::GoogleJobs {
            title,
            company,
            location,
            salary,
            url,
            description,
            employment_type,
        } => {
            let title = title.trim().to_string();
            let company = company.trim().to_string();
            let description = description.unwrap_or_default();

            let mut job_nature = employment_type
                .as_deref()
                .map(JobNature::from_text)
                .unwrap_or_default();
            if job_nature == JobNature::Unspecified {
                job_nature = infer_nature(&title, &description, JobNature::Onsite);
            }

            let apply_link = url
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| fallback_apply_link(&title, &company));

            Listing {
                title,
                company,
                location: location.unwrap_or_default().trim().to_string(),
                job_nature,
                experience: String::new(),
                salary: salary.unwrap_or_default(),
                description,
                apply_link,
                source: Source::GoogleJobs,
                job_id: None,
            }
        }
        RawListing::LinkedinScrape {
            title,
            company,
            location,
            href,
        } => {
            let title = title.trim().to_string();
            let company = company.trim().to_string();
            let apply_link = href
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| fallback_apply_link(&title, &company));

            Listing {
                title,
                company,
                location: location.unwrap_or_default().trim().to_string(),
                job_nature: JobNature::Unspecified,
                experience: String::new(),
                salary: String::new(),
                description: String::new(),
                apply_link,
                source: Source::LinkedinScrape,
                job_id: None,
            }
        }
    }
}

/// Normalize a whole batch and collapse dedupe-key duplicates.
///
/// Within a group the richest listing (most populated fields) wins; ties go
/// to the higher-priority source. Group order follows first appearance.
pub fn normalize_all(raws: Vec<RawListing>) -> Vec<Listing> {
    let mut listings: Vec<Listing> = Vec::with_capacity(raws.len());
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for raw in raws {
        let candidate = normalize(raw);
        let key = candidate.dedupe_key();
        match by_key.get(&key) {
            Some(&idx) => {
                let kept = &listings[idx];
                let replace = match candidate.richness().cmp(&kept.richness()) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Equal => {
                        candidate.source.priority() < kept.source.priority()
                    }
                    std::cmp::Ordering::Less => false,
                };
                if replace {
                    tracing::debug!(
                        key = %key,
                        kept = %candidate.source,
                        dropped = %kept.source,
                        "Duplicate listing collapsed"
                    );
                    listings[idx] = candidate;
                }
            }
            None => {
                by_key.insert(key, listings.len());
                listings.push(candidate);
            }
        }
    }

    listings
}

/// Constructed search-engine query URL for listings without a direct link,
/// so the user always has something to act on.
pub fn fallback_apply_link(title: &str, company: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &format!("{title} {company} job"))
        .finish();
    format!("https://www.google.com/search?{query}")
}

/// City/state preferred; country only when neither is present.
fn join_location(
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(c) = city.filter(|c| !c.is_empty()) {
        parts.push(c);
    }
    if let Some(s) = state.filter(|s| !s.is_empty()) {
        parts.push(s);
    }
    if parts.is_empty()
        && let Some(c) = country.filter(|c| !c.is_empty())
    {
        parts.push(c);
    }
    parts.join(", ")
}

/// Remote keywords in the title or the head of the description promote a
/// listing to Remote; otherwise fall back to the given default.
fn infer_nature(title: &str, description: &str, default: JobNature) -> JobNature {
    let head: String = description.chars().take(500).collect();
    match JobNature::from_text(title) {
        JobNature::Unspecified => match JobNature::from_text(&head) {
            JobNature::Unspecified => default,
            found => found,
        },
        found => found,
    }
}
