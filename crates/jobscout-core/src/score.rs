//! Two-tier relevance scoring.
//!
//! Tier 1 is a cheap, network-free prefilter over structural signals (title
//! keyword, location, job nature, skills). It triages which listings deserve
//! the expensive Tier 2 pass: a structured prompt sent to the scoring
//! oracle, bounded to the top-K prefilter candidates so a large result set
//! cannot exhaust the oracle's rate limit.

use crate::error::AppError;
use crate::models::{JobNature, Listing, ScoredListing, SearchCriteria};
use crate::retry::{Caller, RetryConfig};
use crate::traits::ScoreOracle;

/// Relative weighting of the scoring signals.
///
/// The prefilter values are raw points, normalized by the maximum attainable
/// for the criteria so `prefilter_score` lands in [0, 1] and is comparable
/// to the oracle's range. The boost caps bound how far skills matching can
/// move a listing: enough to reorder within a score band, never enough to
/// override a large prefilter/deep-score gap.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    /// Points when the sought position appears in the listing title.
    pub title_keyword: f64,
    /// Points when the sought location is a substring of the listing's.
    pub location_match: f64,
    /// Points for an exact job-nature match.
    pub nature_match: f64,
    /// Points per skill found in the title.
    pub skill_in_title: f64,
    /// Points per skill found only in the description.
    pub skill_in_description: f64,
    /// Bonus when more than half the skills are found.
    pub majority_skills_bonus: f64,
    /// Per-skill contribution to the boost ratio when matched only in the
    /// description (title matches contribute 1.0).
    pub description_skill_weight: f64,
    /// Skills boost ceiling for oracle-scored listings.
    pub deep_boost_cap: f64,
    /// Skills boost ceiling for prefilter-only listings.
    pub shallow_boost_cap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_keyword: 5.0,
            location_match: 2.0,
            nature_match: 1.0,
            skill_in_title: 2.0,
            skill_in_description: 1.0,
            majority_skills_bonus: 2.0,
            description_skill_weight: 0.6,
            deep_boost_cap: 0.3,
            shallow_boost_cap: 0.2,
        }
    }
}

/// Tier 1: structural relevance estimate in [0, 1]. No network calls.
pub fn prefilter_score(
    listing: &Listing,
    criteria: &SearchCriteria,
    weights: &ScoringWeights,
) -> f64 {
    let title = listing.title.to_lowercase();
    let description = listing.description.to_lowercase();
    let skills = criteria.normalized_skills();

    let mut points = 0.0;
    let mut max = weights.title_keyword;

    if title.contains(&criteria.position.trim().to_lowercase()) {
        points += weights.title_keyword;
    }

    if !criteria.location.trim().is_empty() {
        max += weights.location_match;
        if listing
            .location
            .to_lowercase()
            .contains(&criteria.location.trim().to_lowercase())
        {
            points += weights.location_match;
        }
    }

    if criteria.job_nature != JobNature::Unspecified {
        max += weights.nature_match;
        if listing.job_nature == criteria.job_nature {
            points += weights.nature_match;
        }
    }

    if !skills.is_empty() {
        max += skills.len() as f64 * weights.skill_in_title + weights.majority_skills_bonus;
        let mut found = 0usize;
        for skill in &skills {
            if title.contains(skill.as_str()) {
                points += weights.skill_in_title;
                found += 1;
            } else if description.contains(skill.as_str()) {
                points += weights.skill_in_description;
                found += 1;
            }
        }
        if found * 2 > skills.len() {
            points += weights.majority_skills_bonus;
        }
    }

    if max <= 0.0 {
        return 0.0;
    }
    (points / max).clamp(0.0, 1.0)
}

/// Result of matching the criteria's skills against one listing.
#[derive(Debug, Clone, Default)]
pub struct SkillsMatch {
    /// |skills found in title ∪ description| / |skills|.
    pub ratio: f64,
    /// Like `ratio` but a title match weighs 1.0 against
    /// `description_skill_weight` for description-only matches.
    pub weighted: f64,
    pub matched: Vec<String>,
}

/// Case-insensitive substring matching of skills against title and
/// description. Works with an empty description (title-only matching).
pub fn match_skills(listing: &Listing, skills: &[String], weights: &ScoringWeights) -> SkillsMatch {
    if skills.is_empty() {
        return SkillsMatch::default();
    }
    let title = listing.title.to_lowercase();
    let description = listing.description.to_lowercase();

    let mut matched = Vec::new();
    let mut weighted_sum = 0.0;
    for skill in skills {
        if title.contains(skill.as_str()) {
            weighted_sum += 1.0;
            matched.push(skill.clone());
        } else if description.contains(skill.as_str()) {
            weighted_sum += weights.description_skill_weight;
            matched.push(skill.clone());
        }
    }

    let n = skills.len() as f64;
    SkillsMatch {
        ratio: matched.len() as f64 / n,
        weighted: weighted_sum / n,
        matched,
    }
}

/// Build the structured comparison prompt sent to the scoring oracle.
///
/// The description is truncated to keep the prompt inside the oracle's
/// token budget.
pub fn scoring_prompt(listing: &Listing, criteria: &SearchCriteria) -> String {
    let or_unspecified = |s: &str| {
        if s.is_empty() {
            "Not specified".to_string()
        } else {
            s.to_string()
        }
    };
    let description: String = if listing.description.is_empty() {
        "Not available".to_string()
    } else {
        listing.description.chars().take(500).collect()
    };

    format!(
        "Score job relevance (0.0-1.0):\n\n\
         Job: {title} at {company}\n\
         Location: {location}\n\
         Type: {nature}\n\
         Salary: {salary}\n\
         Experience: {experience}\n\n\
         User wants:\n\
         Position: {position}\n\
         Location: {user_location}\n\
         Type: {user_nature}\n\
         Salary: {user_salary}\n\
         Experience: {user_experience}\n\
         Skills: {user_skills}\n\n\
         Job description excerpt: {description}...\n\n\
         Pay special attention to skills match. If the required skills match \
         the user's skills, give higher score.\n\n\
         Return only: {{\"score\": 0.XX}}",
        title = listing.title,
        company = listing.company,
        location = or_unspecified(&listing.location),
        nature = listing.job_nature,
        salary = or_unspecified(&listing.salary),
        experience = or_unspecified(&listing.experience),
        position = criteria.position,
        user_location = or_unspecified(&criteria.location),
        user_nature = criteria.job_nature,
        user_salary = or_unspecified(&criteria.salary_range),
        user_experience = or_unspecified(&criteria.experience),
        user_skills = if criteria.skills.is_empty() {
            "Not specified".to_string()
        } else {
            criteria.skills.join(", ")
        },
        description = description,
    )
}

/// Tier 2 scorer plus final-score assembly.
#[derive(Clone)]
pub struct Scorer<O: ScoreOracle> {
    oracle: O,
    caller: Caller,
    weights: ScoringWeights,
}

impl<O: ScoreOracle> Scorer<O> {
    pub fn new(oracle: O, retry: RetryConfig, weights: ScoringWeights) -> Self {
        Self {
            oracle,
            caller: Caller::new(retry),
            weights,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Ask the oracle for a deep score. Retries transient failures; maps
    /// terminal failure to `ScoringFailed` so the caller can degrade the
    /// listing instead of failing the request.
    pub async fn deep_score(
        &self,
        listing: &Listing,
        criteria: &SearchCriteria,
    ) -> Result<f64, AppError> {
        let prompt = scoring_prompt(listing, criteria);
        let score = self
            .caller
            .call("oracle.score", || self.oracle.score(&prompt))
            .await
            .map_err(|e| AppError::ScoringFailed(e.to_string()))?;
        Ok(score.clamp(0.0, 1.0))
    }

    /// Combine the tiers into a final score: deep score when present,
    /// prefilter otherwise, plus a bounded skills boost.
    pub fn finalize(
        &self,
        listing: Listing,
        prefilter: f64,
        deep: Option<f64>,
        criteria: &SearchCriteria,
    ) -> ScoredListing {
        let skills = criteria.normalized_skills();
        let m = match_skills(&listing, &skills, &self.weights);
        let cap = if deep.is_some() {
            self.weights.deep_boost_cap
        } else {
            self.weights.shallow_boost_cap
        };
        let base = deep.unwrap_or(prefilter);
        ScoredListing {
            listing,
            prefilter_score: prefilter,
            deep_score: deep,
            skills_match_ratio: m.ratio,
            final_score: base + cap * m.weighted,
        }
    }
}
