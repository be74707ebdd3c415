//! Template pools for fabricated postings, shared by the `*-style` adapters
//! and the backfill generator.
//!
//! Title and company for sequence number `n` depend only on the offsets drawn
//! at construction, so `n -> (title, company)` is injective for one generator.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value as JsonValue};

const TITLE_PATTERNS: &[&str] = &[
    "{}",
    "Senior {}",
    "Junior {}",
    "Lead {}",
    "{} II",
    "Principal {}",
    "Staff {}",
    "Associate {}",
];

const COMPANIES: &[&str] = &[
    "Northwind Labs",
    "Brightpath Software",
    "Bluefin Systems",
    "Cedar & Pine Technologies",
    "Lumen Analytics",
    "Quarry Cloud",
    "Harbor Digital",
    "Summit Data Co",
    "Ironleaf Solutions",
    "Meridian Works",
    "Nimbus Health Tech",
    "Orchid Fintech",
];

const CITIES: &[&str] = &[
    "New York",
    "San Francisco",
    "Austin",
    "Seattle",
    "Chicago",
    "Boston",
    "Denver",
    "London",
    "Berlin",
    "Toronto",
];

const SKILL_POOL: &[&str] = &[
    "Rust",
    "Python",
    "TypeScript",
    "React",
    "PostgreSQL",
    "Docker",
    "Kubernetes",
    "AWS",
    "Go",
    "GraphQL",
    "Java",
    "Terraform",
];

const EMPLOYMENT_TYPES: &[&str] = &["Full-time", "Full-time", "Full-time", "Contract", "Part-time", "Hybrid"];

const TEAMS: &[&str] = &["platform", "product", "data", "growth", "infrastructure", "core"];

const SENIORITY_PREFIXES: &[&str] = &["senior", "sr", "sr.", "junior", "jr", "jr.", "lead", "principal", "staff"];

const UPPERCASE_WORDS: &[&str] = &["qa", "ui", "ux", "ai", "ml", "sre", "aws", "api", "it", "hr", "gcp", "bi"];

const FALLBACK_BASE_TITLE: &str = "Software Developer";

pub struct ListingTemplateGenerator<R: Rng> {
    rng: R,
    base_title: String,
    location: String,
    now: DateTime<Utc>,
    apply_url: String,
    title_offset: usize,
    company_offset: usize,
}

impl<R: Rng> ListingTemplateGenerator<R> {
    pub fn new(mut rng: R, keywords: &str, location: &str, now: DateTime<Utc>, apply_url: impl Into<String>) -> Self {
        let title_offset = rng.gen_range(0..TITLE_PATTERNS.len());
        let company_offset = rng.gen_range(0..COMPANIES.len());
        Self {
            rng,
            base_title: base_title(keywords),
            location: location.trim().to_string(),
            now,
            apply_url: apply_url.into(),
            title_offset,
            company_offset,
        }
    }

    pub fn title_company(&self, n: usize) -> (String, String) {
        let titles = TITLE_PATTERNS.len();
        let block = titles * COMPANIES.len();
        let pattern = TITLE_PATTERNS[(n + self.title_offset) % titles];
        let company = COMPANIES[((n % block) / titles + self.company_offset) % COMPANIES.len()];
        let cycle = n / block;
        let company = if cycle == 0 {
            company.to_string()
        } else {
            format!("{company} {}", cycle + 1)
        };
        (pattern.replace("{}", &self.base_title), company)
    }

    /// Payload in the `Generated` provider schema for sequence number `n`.
    pub fn payload(&mut self, n: usize) -> JsonValue {
        let (title, company) = self.title_company(n);

        let remote = if self.location.eq_ignore_ascii_case("remote") {
            true
        } else if self.location.is_empty() {
            self.rng.gen_bool(0.6)
        } else {
            false
        };
        let location = if !self.location.is_empty() {
            self.location.clone()
        } else if remote {
            "Remote".to_string()
        } else {
            CITIES.choose(&mut self.rng).copied().unwrap_or("New York").to_string()
        };

        let salary_min = self.rng.gen_range(12..=30) * 5_000u32;
        let salary_max = salary_min + self.rng.gen_range(2..=8) * 5_000u32;
        let hours_ago = self.rng.gen_range(1..=24 * 14);
        let posted_at = self.now - Duration::hours(i64::from(hours_ago));
        let employment_type = if remote {
            "Remote"
        } else {
            EMPLOYMENT_TYPES.choose(&mut self.rng).copied().unwrap_or("Full-time")
        };
        let skills: Vec<&str> = SKILL_POOL.choose_multiple(&mut self.rng, 3).copied().collect();
        let team = TEAMS.choose(&mut self.rng).copied().unwrap_or("product");
        let description = self.description(&title, &company, team, &skills, remote);

        json!({
            "id": (n + 1).to_string(),
            "title": title,
            "company": company,
            "location": location,
            "description": description,
            "salary": format!("${} - ${}", with_commas(salary_min), with_commas(salary_max)),
            "salary_min": salary_min,
            "salary_max": salary_max,
            "employment_type": employment_type,
            "posted_at": posted_at.to_rfc3339(),
            "remote": remote,
            "skills": skills,
            "apply_url": self.apply_url,
        })
    }

    fn description(&mut self, title: &str, company: &str, team: &str, skills: &[&str], remote: bool) -> String {
        let skills_text = match skills {
            [a, b, c, ..] => format!("{a}, {b} and {c}"),
            [a, b] => format!("{a} and {b}"),
            [a] => a.to_string(),
            [] => "modern tooling".to_string(),
        };
        let body = match self.rng.gen_range(0..3) {
            0 => format!(
                "{company} is hiring a {title} to join the {team} team. You will work with {skills_text} to ship features used by thousands of customers."
            ),
            1 => format!(
                "As a {title} at {company} you will own services end to end on the {team} team, using {skills_text} every day."
            ),
            _ => format!(
                "Join {company}'s {team} team as a {title}. We value pragmatic engineering with {skills_text} and thoughtful code review."
            ),
        };
        if remote {
            format!("{body} This role is remote-friendly.")
        } else {
            body
        }
    }
}

/// Title-cased keywords without leading seniority words.
pub fn base_title(keywords: &str) -> String {
    let words: Vec<&str> = keywords
        .split_whitespace()
        .skip_while(|w| SENIORITY_PREFIXES.contains(&w.to_lowercase().as_str()))
        .collect();
    if words.is_empty() {
        return FALLBACK_BASE_TITLE.to_string();
    }
    words.iter().map(|w| title_case_word(w)).collect::<Vec<_>>().join(" ")
}

fn title_case_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if UPPERCASE_WORDS.contains(&lower.as_str()) {
        return lower.to_uppercase();
    }
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn with_commas(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).single().unwrap()
    }

    fn generator(seed: u64, keywords: &str, location: &str) -> ListingTemplateGenerator<StdRng> {
        ListingTemplateGenerator::new(StdRng::seed_from_u64(seed), keywords, location, now(), "#")
    }

    #[test]
    fn base_title_strips_seniority_and_title_cases() {
        assert_eq!(base_title("senior rust developer"), "Rust Developer");
        assert_eq!(base_title("qa engineer"), "QA Engineer");
        assert_eq!(base_title("   "), FALLBACK_BASE_TITLE);
        assert_eq!(base_title("lead"), FALLBACK_BASE_TITLE);
    }

    #[test]
    fn title_company_pairs_never_repeat() {
        let gen = generator(1, "data engineer", "");
        let pairs: HashSet<_> = (0..300).map(|n| gen.title_company(n)).collect();
        assert_eq!(pairs.len(), 300);
    }

    #[test]
    fn same_seed_same_payloads() {
        let mut a = generator(42, "rust developer", "Berlin");
        let mut b = generator(42, "rust developer", "Berlin");
        for n in 0..5 {
            assert_eq!(a.payload(n), b.payload(n));
        }
    }

    #[test]
    fn payload_honours_requested_location_and_recent_dates() {
        let mut gen = generator(9, "rust developer", "Berlin");
        let payload = gen.payload(0);
        assert_eq!(payload["location"], "Berlin");
        assert_eq!(payload["id"], "1");
        let posted = DateTime::parse_from_rfc3339(payload["posted_at"].as_str().unwrap()).unwrap();
        assert!(posted.with_timezone(&Utc) < now());
        assert!(payload["salary_max"].as_u64().unwrap() > payload["salary_min"].as_u64().unwrap());
        assert_eq!(payload["skills"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn remote_request_yields_remote_postings() {
        let mut gen = generator(3, "rust developer", "Remote");
        for n in 0..10 {
            let payload = gen.payload(n);
            assert_eq!(payload["remote"], true);
            assert_eq!(payload["location"], "Remote");
        }
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(with_commas(95_000), "95,000");
        assert_eq!(with_commas(150), "150");
        assert_eq!(with_commas(1_200_000), "1,200,000");
    }
}
