//! Bounded, best-effort result cache.
//!
//! Maps a fingerprint of normalized search criteria to a prior ranked result
//! set, evicted by age and capacity. Mutated only by successful completed
//! searches; concurrent readers and racing writers for the same key are safe
//! (last write wins, entries are immutable once stored).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::models::{ScoredListing, SearchCriteria, normalize_field};

/// Stable hash of normalized criteria plus the requested limit.
///
/// Field order is fixed and skills are sorted, so semantically identical
/// requests always map to the same key.
pub fn fingerprint(criteria: &SearchCriteria, limit: usize) -> String {
    let mut skills = criteria.normalized_skills();
    skills.sort();

    let mut hasher = Sha256::new();
    hasher.update(normalize_field(&criteria.position));
    hasher.update(b"\x1f");
    hasher.update(normalize_field(&criteria.location));
    hasher.update(b"\x1f");
    hasher.update(criteria.job_nature.as_str());
    hasher.update(b"\x1f");
    hasher.update(normalize_field(&criteria.experience));
    hasher.update(b"\x1f");
    hasher.update(normalize_field(&criteria.salary_range));
    hasher.update(b"\x1f");
    hasher.update(skills.join(","));
    hasher.update(b"\x1f");
    hasher.update(limit.to_string());
    format!("{:x}", hasher.finalize())
}

/// TTL + capacity bounded cache of ranked result sets.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<String, Arc<Vec<ScoredListing>>>,
}

impl ResultCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, fingerprint: &str) -> Option<Arc<Vec<ScoredListing>>> {
        self.inner.get(fingerprint).await
    }

    pub async fn put(&self, fingerprint: String, results: Vec<ScoredListing>) {
        self.inner.insert(fingerprint, Arc::new(results)).await;
    }
}
