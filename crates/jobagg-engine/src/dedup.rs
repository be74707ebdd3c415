//! Exact-key deduplication plus a read-only near-duplicate report.

use std::collections::HashSet;

use jobagg_core::{Job, ReviewCandidate};
use strsim::jaro_winkler;

pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.92;

pub fn dedup_key(title: &str, company: &str) -> String {
    format!("{}_{}", title.trim().to_lowercase(), company.trim().to_lowercase())
}

pub fn job_key(job: &Job) -> String {
    dedup_key(&job.title, &job.company)
}

/// Incremental first-seen-wins accumulator of dedup keys.
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the job's key; `false` when an earlier job already holds it.
    pub fn insert(&mut self, job: &Job) -> bool {
        self.seen.insert(job_key(job))
    }

    pub fn contains(&self, job: &Job) -> bool {
        self.seen.contains(&job_key(job))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Keeps the first job per key, preserving arrival order.
pub fn deduplicate(jobs: Vec<Job>) -> Vec<Job> {
    let mut dedup = Deduplicator::new();
    jobs.into_iter().filter(|job| dedup.insert(job)).collect()
}

/// Pairs of distinct-key jobs whose keys are similar enough to deserve a
/// second look. Nothing is removed.
pub fn near_duplicates(jobs: &[Job], threshold: f64) -> Vec<ReviewCandidate> {
    let keys: Vec<String> = jobs.iter().map(job_key).collect();
    let mut out = Vec::new();
    for i in 0..jobs.len() {
        for j in (i + 1)..jobs.len() {
            if keys[i] == keys[j] {
                continue;
            }
            let score = jaro_winkler(&keys[i], &keys[j]);
            if score >= threshold {
                out.push(ReviewCandidate {
                    job_id_a: jobs[i].id.clone(),
                    job_id_b: jobs[j].id.clone(),
                    similarity: score,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::job;

    #[test]
    fn key_ignores_case_and_padding() {
        assert_eq!(dedup_key(" Backend Developer ", "Acme"), dedup_key("backend developer", "ACME "));
        assert_ne!(dedup_key("Backend Developer", "Acme"), dedup_key("Backend Developer", "Acme Corp"));
    }

    #[test]
    fn first_seen_wins_and_order_is_kept() {
        let jobs = vec![
            job("remotive-1", "Backend Developer", "Acme"),
            job("arbeitnow-1", "Data Engineer", "Datenfluss AG"),
            job("arbeitnow-2", "backend developer", "ACME"),
        ];
        let kept = deduplicate(jobs);
        let ids: Vec<_> = kept.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["remotive-1", "arbeitnow-1"]);
    }

    #[test]
    fn deduplication_is_idempotent() {
        let jobs = vec![
            job("a-1", "Rust Engineer", "Ferrous"),
            job("b-1", "rust engineer", "ferrous"),
            job("c-1", "Go Developer", "Gopher Works"),
        ];
        let once = deduplicate(jobs);
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn near_duplicates_are_reported_not_removed() {
        let jobs = vec![
            job("a-1", "Senior Rust Engineer", "Ferrous Systems"),
            job("b-1", "Senior Rust Engineer", "Ferrous Systems Co"),
            job("c-1", "Marketing Manager", "Brandhaus"),
        ];
        let candidates = near_duplicates(&jobs, NEAR_DUPLICATE_THRESHOLD);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].job_id_a, "a-1");
        assert_eq!(candidates[0].job_id_b, "b-1");
        assert!(candidates[0].similarity >= NEAR_DUPLICATE_THRESHOLD);
        assert_eq!(deduplicate(jobs).len(), 3);
    }
}
