//! Core domain model for the job listing aggregator.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub const CRATE_NAME: &str = "jobagg-core";

/// Source tag carried by every backfilled job.
pub const SYNTHETIC_SOURCE: &str = "synthetic";

/// Suffix carried by the source tag of generative adapters (`linkedin-style`).
pub const STYLE_SOURCE_SUFFIX: &str = "-style";

pub const DEFAULT_TITLE: &str = "Untitled Position";
pub const DEFAULT_COMPANY: &str = "Unknown Company";
pub const DEFAULT_LOCATION: &str = "Location not specified";
pub const DEFAULT_DESCRIPTION: &str = "No description available.";
pub const DEFAULT_SALARY: &str = "Competitive";
pub const DEFAULT_APPLY_URL: &str = "#";
pub const DEFAULT_POSTED_AGO: &str = "Recently";

/// Which provider mapping the normalizer applies to a raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSchema {
    Remotive,
    Arbeitnow,
    RemoteOk,
    TheMuse,
    Adzuna,
    Jooble,
    /// Payloads produced by the listing template generator.
    Generated,
}

/// Provider-native representation of one posting, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub source_id: String,
    pub schema: ProviderSchema,
    pub fetched_at: DateTime<Utc>,
    pub payload: JsonValue,
}

impl RawListing {
    pub fn new(source_id: impl Into<String>, schema: ProviderSchema, fetched_at: DateTime<Utc>, payload: JsonValue) -> Self {
        Self {
            source_id: source_id.into(),
            schema,
            fetched_at,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Remote,
    Hybrid,
    Internship,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Contract => "Contract",
            Self::Remote => "Remote",
            Self::Hybrid => "Hybrid",
            Self::Internship => "Internship",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Seniority {
    Intern,
    Junior,
    Mid,
    Senior,
    Lead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Canonical, provider-agnostic job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub apply_url: String,
    pub salary: String,
    /// Annualized lower bound, when the provider exposed numbers.
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub employment_type: EmploymentType,
    pub posted_ago: String,
    pub skills: Vec<String>,
    pub remote: bool,
    pub seniority: Seniority,
    pub priority: Priority,
    pub source: String,
    pub match_score: u8,
    pub salary_score: u8,
    pub company_score: u8,
}

impl Job {
    /// True for backfilled jobs and for jobs produced by generative adapters.
    pub fn is_synthetic(&self) -> bool {
        is_synthetic_source(&self.source)
    }
}

pub fn is_synthetic_source(source: &str) -> bool {
    source == SYNTHETIC_SOURCE || source.ends_with(STYLE_SOURCE_SUFFIX)
}

/// Terminal state of one adapter attempt within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceOutcome {
    Success,
    Empty,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub source_id: String,
    pub priority: u32,
    pub outcome: SourceOutcome,
    pub returned: usize,
    /// Jobs this source added after deduplication.
    pub accepted: usize,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

/// Two kept jobs whose dedup keys are similar but not identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCandidate {
    pub job_id_a: String,
    pub job_id_b: String,
    pub similarity: f64,
}

/// Result envelope handed back to the request-handling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub success: bool,
    pub run_id: Uuid,
    pub keywords: String,
    pub location: String,
    pub jobs: Vec<Job>,
    pub total_found: usize,
    pub successful_sources: usize,
    pub processing_time_ms: u64,
    pub source_breakdown: BTreeMap<String, usize>,
    pub real_count: usize,
    pub synthetic_count: usize,
    pub cancelled: bool,
    pub sources: Vec<SourceReport>,
    pub review_candidates: Vec<ReviewCandidate>,
}

/// Walks `path` through nested objects and returns the string leaf, if any.
pub fn json_str<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a str> {
    json_at(value, path)?.as_str()
}

/// Numeric leaf; numeric strings ("85000") are accepted too.
pub fn json_f64(value: &JsonValue, path: &[&str]) -> Option<f64> {
    let leaf = json_at(value, path)?;
    leaf.as_f64()
        .or_else(|| leaf.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

pub fn json_bool(value: &JsonValue, path: &[&str]) -> Option<bool> {
    json_at(value, path)?.as_bool()
}

pub fn json_string_vec(value: &JsonValue, path: &[&str]) -> Option<Vec<String>> {
    let arr = json_at(value, path)?.as_array()?;
    let vals = arr
        .iter()
        .filter_map(|v| v.as_str().map(ToString::to_string))
        .collect::<Vec<_>>();
    if vals.is_empty() {
        None
    } else {
        Some(vals)
    }
}

/// Provider ids arrive as strings or numbers depending on the provider.
pub fn json_id(value: &JsonValue, path: &[&str]) -> Option<String> {
    match json_at(value, path)? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_at<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let mut cur = value;
    for segment in path {
        cur = cur.get(*segment)?;
    }
    if cur.is_null() {
        None
    } else {
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_helpers_walk_nested_paths() {
        let v = json!({
            "company": {"display_name": "Acme"},
            "salary_min": "85000",
            "id": 42,
            "tags": ["rust", 3, "go"],
            "empty": null
        });
        assert_eq!(json_str(&v, &["company", "display_name"]), Some("Acme"));
        assert_eq!(json_f64(&v, &["salary_min"]), Some(85000.0));
        assert_eq!(json_id(&v, &["id"]).as_deref(), Some("42"));
        assert_eq!(
            json_string_vec(&v, &["tags"]).unwrap(),
            vec!["rust".to_string(), "go".to_string()]
        );
        assert_eq!(json_str(&v, &["empty"]), None);
        assert_eq!(json_str(&v, &["missing", "deeper"]), None);
    }

    #[test]
    fn synthetic_sources_are_discoverable() {
        assert!(is_synthetic_source(SYNTHETIC_SOURCE));
        assert!(is_synthetic_source("linkedin-style"));
        assert!(!is_synthetic_source("remotive"));
    }

    #[test]
    fn enums_serialize_to_display_vocabulary() {
        assert_eq!(serde_json::to_string(&EmploymentType::FullTime).unwrap(), "\"Full-time\"");
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"HIGH\"");
        assert_eq!(serde_json::to_string(&SourceOutcome::Failed).unwrap(), "\"FAILED\"");
        assert_eq!(EmploymentType::PartTime.to_string(), "Part-time");
    }
}
