//! Free-text search phrase to `(keywords, location)`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_KEYWORDS: &str = "software developer";
const MAX_FALLBACK_TOKENS: usize = 3;

/// Known job-title phrases and the keywords they stand for. Matching picks
/// the longest phrase present, so table order does not matter.
const TITLE_PHRASES: &[(&str, &str)] = &[
    ("full stack developer", "full stack developer"),
    ("full stack engineer", "full stack engineer"),
    ("fullstack", "full stack developer"),
    ("full stack", "full stack developer"),
    ("front end", "frontend developer"),
    ("frontend", "frontend developer"),
    ("back end", "backend developer"),
    ("backend", "backend developer"),
    ("software engineer", "software engineer"),
    ("software developer", "software developer"),
    ("web developer", "web developer"),
    ("mobile developer", "mobile developer"),
    ("ios developer", "ios developer"),
    ("android developer", "android developer"),
    ("rust developer", "rust developer"),
    ("rust engineer", "rust engineer"),
    ("python developer", "python developer"),
    ("java developer", "java developer"),
    ("golang developer", "go developer"),
    ("go developer", "go developer"),
    ("javascript developer", "javascript developer"),
    ("react developer", "react developer"),
    ("data scientist", "data scientist"),
    ("data science", "data scientist"),
    ("data engineer", "data engineer"),
    ("data analyst", "data analyst"),
    ("machine learning engineer", "machine learning engineer"),
    ("machine learning", "machine learning engineer"),
    ("ml engineer", "machine learning engineer"),
    ("devops engineer", "devops engineer"),
    ("devops", "devops engineer"),
    ("site reliability engineer", "site reliability engineer"),
    ("site reliability", "site reliability engineer"),
    ("sre", "site reliability engineer"),
    ("cloud engineer", "cloud engineer"),
    ("security engineer", "security engineer"),
    ("qa engineer", "qa engineer"),
    ("test automation", "qa engineer"),
    ("product manager", "product manager"),
    ("project manager", "project manager"),
    ("ux designer", "ux designer"),
    ("ui designer", "ui designer"),
    ("product designer", "product designer"),
    ("engineering manager", "engineering manager"),
];

const LOCATIONS: &[(&str, &str)] = &[
    ("new york city", "New York"),
    ("new york", "New York"),
    ("nyc", "New York"),
    ("san francisco", "San Francisco"),
    ("bay area", "San Francisco"),
    ("sf", "San Francisco"),
    ("los angeles", "Los Angeles"),
    ("seattle", "Seattle"),
    ("austin", "Austin"),
    ("boston", "Boston"),
    ("chicago", "Chicago"),
    ("denver", "Denver"),
    ("london", "London"),
    ("berlin", "Berlin"),
    ("munich", "Munich"),
    ("toronto", "Toronto"),
    ("work from home", "Remote"),
    ("wfh", "Remote"),
    ("anywhere", "Remote"),
    ("remote", "Remote"),
];

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "in", "on", "at", "for", "of", "to", "and", "or", "with", "near", "around", "from", "job",
    "jobs", "position", "positions", "role", "roles", "opening", "openings", "looking", "find", "search", "show",
    "me", "i", "im", "want", "need", "some", "any", "my", "is", "are", "available", "please", "hiring", "work",
    "career", "careers", "opportunity", "opportunities",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keywords: String,
    /// Canonical display name, or empty when the phrase named no place.
    pub location: String,
}

pub fn interpret(phrase: &str) -> SearchQuery {
    let tokens = tokenize(phrase);
    let padded = format!(" {} ", tokens.join(" "));

    let location = longest_match(&padded, LOCATIONS);
    let keywords = match longest_match(&padded, TITLE_PHRASES) {
        Some((_, keywords)) => keywords.to_string(),
        None => fallback_keywords(&tokens, location.map(|(matched, _)| matched)),
    };

    SearchQuery {
        keywords,
        location: location.map(|(_, name)| name.to_string()).unwrap_or_default(),
    }
}

fn tokenize(phrase: &str) -> Vec<String> {
    phrase
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn longest_match(padded: &str, table: &'static [(&'static str, &'static str)]) -> Option<(&'static str, &'static str)> {
    table
        .iter()
        .filter(|(needle, _)| padded.contains(&format!(" {needle} ")))
        .max_by_key(|(needle, _)| needle.len())
        .copied()
}

fn fallback_keywords(tokens: &[String], matched_location: Option<&str>) -> String {
    let location_words: Vec<&str> = matched_location.map(|l| l.split(' ').collect()).unwrap_or_default();
    let significant: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !STOP_WORDS.contains(t) && !location_words.contains(t))
        .take(MAX_FALLBACK_TOKENS)
        .collect();
    if significant.is_empty() {
        DEFAULT_KEYWORDS.to_string()
    } else {
        significant.join(" ")
    }
}
