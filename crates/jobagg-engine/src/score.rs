//! Relevance, salary and company sub-scores, and result ordering.

use std::cmp::Ordering;
use std::str::FromStr;

use jobagg_core::Job;
use serde::{Deserialize, Serialize};

const BASE_MATCH: i32 = 50;
const ENGINEER_BONUS: i32 = 20;
const DEVELOPER_BONUS: i32 = 15;
const KEYWORD_BONUS: i32 = 5;
const MAX_KEYWORD_BONUS: i32 = 15;
const MAX_SKILL_BONUS: i32 = 10;
const REMOTE_BONUS: i32 = 10;
const RECENCY_BONUS: i32 = 10;

const UNKNOWN_SALARY_SCORE: u8 = 50;
/// Annual upper bound thresholds, highest first.
const SALARY_BANDS: &[(f64, u8)] = &[
    (150_000.0, 95),
    (120_000.0, 85),
    (100_000.0, 75),
    (80_000.0, 65),
    (60_000.0, 55),
];
const LOW_SALARY_SCORE: u8 = 45;

const KNOWN_EMPLOYERS: &[&str] = &[
    "google", "microsoft", "apple", "amazon", "meta", "netflix", "stripe", "shopify", "airbnb", "spotify",
    "salesforce", "adobe", "nvidia", "github", "atlassian", "cloudflare", "datadog", "mozilla", "openai",
    "dropbox", "slack", "uber", "linkedin", "ibm", "oracle",
];
const TECH_NAME_WORDS: &[&str] = &[
    "labs", "lab", "tech", "technologies", "technology", "software", "systems", "digital", "cloud", "data",
    "analytics", "ai", "io", "solutions", "works", "fintech", "dev",
];
const KNOWN_EMPLOYER_SCORE: u8 = 90;
const TECH_COMPANY_SCORE: u8 = 70;
const OTHER_COMPANY_SCORE: u8 = 60;

const RECENT_MARKERS: &[&str] = &["just now", "hour", "today"];
const RECENT_DAYS: &[&str] = &["1 day ago", "2 days ago", "3 days ago"];

fn keyword_tokens(keywords: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in keywords.split_whitespace().map(str::to_lowercase) {
        if token.chars().count() >= 2 && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

fn is_recent(posted_ago: &str) -> bool {
    let lower = posted_ago.to_lowercase();
    RECENT_MARKERS.iter().any(|m| lower.contains(m)) || RECENT_DAYS.contains(&lower.as_str())
}

pub fn match_score(job: &Job, keywords: &str) -> u8 {
    let title = job.title.to_lowercase();
    let mut score = BASE_MATCH;
    if title.contains("engineer") {
        score += ENGINEER_BONUS;
    } else if title.contains("developer") {
        score += DEVELOPER_BONUS;
    }
    let hits = keyword_tokens(keywords).iter().filter(|t| title.contains(t.as_str())).count() as i32;
    score += (hits * KEYWORD_BONUS).min(MAX_KEYWORD_BONUS);
    score += (2 * job.skills.len() as i32).min(MAX_SKILL_BONUS);
    if job.remote {
        score += REMOTE_BONUS;
    }
    if is_recent(&job.posted_ago) {
        score += RECENCY_BONUS;
    }
    score.clamp(0, 100) as u8
}

pub fn salary_score(job: &Job) -> u8 {
    let Some(top) = job.salary_max.or(job.salary_min).filter(|v| *v > 0.0) else {
        return UNKNOWN_SALARY_SCORE;
    };
    SALARY_BANDS
        .iter()
        .find(|(floor, _)| top >= *floor)
        .map(|(_, score)| *score)
        .unwrap_or(LOW_SALARY_SCORE)
}

pub fn company_score(company: &str) -> u8 {
    let lower = company.trim().to_lowercase();
    let known = KNOWN_EMPLOYERS
        .iter()
        .any(|name| lower == *name || lower.starts_with(&format!("{name} ")));
    if known {
        return KNOWN_EMPLOYER_SCORE;
    }
    let techish = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| TECH_NAME_WORDS.contains(&word));
    if techish {
        TECH_COMPANY_SCORE
    } else {
        OTHER_COMPANY_SCORE
    }
}

pub fn score_job(job: &mut Job, keywords: &str) {
    job.match_score = match_score(job, keywords);
    job.salary_score = salary_score(job);
    job.company_score = company_score(&job.company);
}

fn ranking_order(a: &Job, b: &Job) -> Ordering {
    b.match_score
        .cmp(&a.match_score)
        .then_with(|| b.salary_score.cmp(&a.salary_score))
        .then_with(|| b.company_score.cmp(&a.company_score))
        .then_with(|| a.id.cmp(&b.id))
}

/// Default ordering: match score, then salary, then company, then id.
pub fn rank(jobs: &mut [Job]) {
    jobs.sort_by(ranking_order);
}

/// Caller-chosen blend of the three sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankWeights {
    pub match_weight: f64,
    pub salary_weight: f64,
    pub company_weight: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            match_weight: 0.6,
            salary_weight: 0.25,
            company_weight: 0.15,
        }
    }
}

impl RankWeights {
    pub fn weighted(&self, job: &Job) -> f64 {
        self.match_weight * f64::from(job.match_score)
            + self.salary_weight * f64::from(job.salary_score)
            + self.company_weight * f64::from(job.company_score)
    }
}

impl FromStr for RankWeights {
    type Err = String;

    /// `"match,salary,company"`, e.g. `"0.5,0.3,0.2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>().map_err(|e| format!("invalid weight `{p}`: {e}")))
            .collect::<Result<_, _>>()?;
        match parts[..] {
            [m, sal, c] if [m, sal, c].iter().all(|w| w.is_finite() && *w >= 0.0) => Ok(Self {
                match_weight: m,
                salary_weight: sal,
                company_weight: c,
            }),
            [_, _, _] => Err("weights must be finite and non-negative".to_string()),
            _ => Err(format!("expected three comma-separated weights, got {}", parts.len())),
        }
    }
}

/// Re-orders already scored jobs by weighted sum; sub-scores are untouched.
pub fn rerank(jobs: &mut [Job], weights: &RankWeights) {
    jobs.sort_by(|a, b| {
        weights
            .weighted(b)
            .total_cmp(&weights.weighted(a))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::job;

    #[test]
    fn match_score_components() {
        let mut j = job("x-1", "Senior Rust Engineer", "Ferrous");
        j.skills = vec!["Rust".into(), "Tokio".into()];
        j.remote = true;
        j.posted_ago = "5 hours ago".into();
        // 50 + 20 engineer + 5 rust + 4 skills + 10 remote + 10 recent
        assert_eq!(match_score(&j, "rust developer"), 99);

        let plain = job("x-2", "Account Executive", "Dealflow");
        assert_eq!(match_score(&plain, "rust developer"), 50);
    }

    #[test]
    fn match_score_is_clamped() {
        let mut j = job("x-1", "Rust Go Python Engineer Developer", "Acme");
        j.skills = (0..10).map(|i| format!("s{i}")).collect();
        j.remote = true;
        j.posted_ago = "Just now".into();
        assert_eq!(match_score(&j, "rust go python developer"), 100);
    }

    #[test]
    fn recency_window_is_three_days() {
        for recent in ["Just now", "1 hour ago", "1 day ago", "3 days ago"] {
            assert!(is_recent(recent), "{recent}");
        }
        for stale in ["4 days ago", "13 days ago", "2 weeks ago", "Recently"] {
            assert!(!is_recent(stale), "{stale}");
        }
    }

    #[test]
    fn salary_bands() {
        let with_max = |max: Option<f64>| {
            let mut j = job("x", "t", "c");
            j.salary_max = max;
            salary_score(&j)
        };
        assert_eq!(with_max(Some(160_000.0)), 95);
        assert_eq!(with_max(Some(120_000.0)), 85);
        assert_eq!(with_max(Some(100_000.0)), 75);
        assert_eq!(with_max(Some(85_000.0)), 65);
        assert_eq!(with_max(Some(60_000.0)), 55);
        assert_eq!(with_max(Some(30_000.0)), 45);
        assert_eq!(with_max(None), 50);
    }

    #[test]
    fn company_tiers() {
        assert_eq!(company_score("Google"), 90);
        assert_eq!(company_score("Microsoft Corporation"), 90);
        assert_eq!(company_score("Ferrous Systems Co"), 70);
        assert_eq!(company_score("Northwind Labs"), 70);
        assert_eq!(company_score("Brandhaus"), 60);
        assert_eq!(company_score("Metamorph Bakery"), 60);
    }

    #[test]
    fn ranking_breaks_ties_by_salary_company_then_id() {
        let mut jobs = vec![job("b", "t", "c"), job("a", "t", "c"), job("c", "t", "c"), job("d", "t", "c")];
        jobs[0].match_score = 70;
        jobs[1].match_score = 70;
        jobs[2].match_score = 70;
        jobs[2].salary_score = 90;
        jobs[3].match_score = 80;
        rank(&mut jobs);
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c", "a", "b"]);
    }

    #[test]
    fn every_score_stays_in_bounds() {
        let mut j = job("x", "", "");
        score_job(&mut j, "");
        for s in [j.match_score, j.salary_score, j.company_score] {
            assert!(s <= 100);
        }
    }

    #[test]
    fn weighted_rerank_keeps_sub_scores() {
        let mut jobs = vec![job("a", "t", "c"), job("b", "t", "c")];
        jobs[0].match_score = 90;
        jobs[0].salary_score = 40;
        jobs[1].match_score = 60;
        jobs[1].salary_score = 95;
        let salary_first: RankWeights = "0.1,0.9,0".parse().unwrap();
        rerank(&mut jobs, &salary_first);
        assert_eq!(jobs[0].id, "b");
        assert_eq!(jobs[0].match_score, 60);
        assert!("1,2".parse::<RankWeights>().is_err());
        assert!("1,-2,0".parse::<RankWeights>().is_err());
    }
}
