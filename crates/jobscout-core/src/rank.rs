//! Final ordering and truncation.
//!
//! `final_score` descending, with a deterministic tie-break so identical
//! inputs always produce identical output: listings carrying a salary beat
//! those without, then listings carrying experience, then source priority,
//! then the dedupe key as a last resort.

use std::cmp::Ordering;

use crate::models::ScoredListing;

/// Requested result counts are clamped to this range.
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 5;
pub const DEFAULT_LIMIT: usize = 3;

pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Sort scored listings into their final order and truncate to `limit`.
pub fn rank(mut scored: Vec<ScoredListing>, limit: usize) -> Vec<ScoredListing> {
    scored.sort_by(compare);
    scored.truncate(clamp_limit(limit));
    scored
}

fn compare(a: &ScoredListing, b: &ScoredListing) -> Ordering {
    b.final_score
        .partial_cmp(&a.final_score)
        .unwrap_or(Ordering::Equal)
        // false < true, so listings with a salary (is_empty == false) first.
        .then_with(|| a.listing.salary.is_empty().cmp(&b.listing.salary.is_empty()))
        .then_with(|| {
            a.listing
                .experience
                .is_empty()
                .cmp(&b.listing.experience.is_empty())
        })
        .then_with(|| a.listing.source.priority().cmp(&b.listing.source.priority()))
        .then_with(|| a.listing.dedupe_key().cmp(&b.listing.dedupe_key()))
}
