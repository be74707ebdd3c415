//! Pure field-inference helpers used by the normalizer.
//!
//! Every function here is deterministic: same input text, same output. Lookup
//! tables and compiled patterns are process-wide statics.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use jobagg_core::{EmploymentType, Priority, Seniority, DEFAULT_POSTED_AGO, DEFAULT_SALARY};
use regex::Regex;
use scraper::{Html, Node};

pub const MAX_SKILLS: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Annualized amounts below this are treated as noise (years, counts).
const MIN_ANNUAL_SALARY: f64 = 1_000.0;
/// Bare numeric salaries under this are read as hourly rates.
const HOURLY_CEILING: f64 = 300.0;
const HOURS_PER_YEAR: f64 = 2080.0;

const HIGH_PRIORITY_SALARY: f64 = 120_000.0;
const MEDIUM_PRIORITY_SALARY: f64 = 80_000.0;

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "section",
];

/// Display name followed by lowercase aliases as they appear in postings.
const SKILL_VOCABULARY: &[(&str, &[&str])] = &[
    ("Rust", &["rust"]),
    ("Python", &["python"]),
    ("JavaScript", &["javascript", "js"]),
    ("TypeScript", &["typescript", "ts"]),
    ("Java", &["java"]),
    ("Go", &["golang"]),
    ("C++", &["c++", "cpp"]),
    ("C#", &["c#", "csharp"]),
    ("Ruby", &["ruby"]),
    ("PHP", &["php"]),
    ("Kotlin", &["kotlin"]),
    ("Swift", &["swift"]),
    ("Scala", &["scala"]),
    ("React", &["react", "reactjs", "react.js"]),
    ("Angular", &["angular"]),
    ("Vue", &["vue", "vue.js", "vuejs"]),
    ("Node.js", &["node.js", "nodejs", "node"]),
    ("Django", &["django"]),
    ("Flask", &["flask"]),
    ("Spring", &["spring", "spring boot"]),
    ("Rails", &["rails", "ruby on rails"]),
    (".NET", &[".net", "dotnet"]),
    ("SQL", &["sql"]),
    ("PostgreSQL", &["postgresql", "postgres"]),
    ("MySQL", &["mysql"]),
    ("MongoDB", &["mongodb", "mongo"]),
    ("Redis", &["redis"]),
    ("GraphQL", &["graphql"]),
    ("AWS", &["aws", "amazon web services"]),
    ("GCP", &["gcp", "google cloud"]),
    ("Azure", &["azure"]),
    ("Docker", &["docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("Terraform", &["terraform"]),
    ("Linux", &["linux"]),
    ("Git", &["git"]),
    ("Machine Learning", &["machine learning", "ml"]),
    ("PyTorch", &["pytorch"]),
    ("TensorFlow", &["tensorflow"]),
    ("Spark", &["spark", "apache spark"]),
    ("Kafka", &["kafka"]),
    ("HTML", &["html"]),
    ("CSS", &["css"]),
];

// Aliases are matched on word edges; `+`, `#` and `.` count as word characters
// so `c++` does not match inside `c+++` and `js` does not match inside `node.js`.
static SKILL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SKILL_VOCABULARY
        .iter()
        .map(|(display, aliases)| {
            let alternation = aliases.iter().map(|a| regex::escape(a)).collect::<Vec<_>>().join("|");
            let pattern = format!(r"(?i)(?:^|[^a-z0-9+#.])(?:{alternation})(?:$|[^a-z0-9+#])");
            (*display, Regex::new(&pattern).unwrap())
        })
        .collect()
});

// Bare "go" is everyday English; only a capitalized `Go` after a lowercase
// word or list separator, and not followed by `-` or `!`, counts as the language.
static GO_LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[a-z0-9,(/&]\s*)Go(?:$|[^A-Za-z0-9\-!'])").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(k\b)?").unwrap());
static HOURLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(per hour|an hour|hourly|/\s*(hr|hour)\b)").unwrap());
static MONTHLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(per month|monthly|/\s*(mo|month)\b)").unwrap());

static REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(remote|work from home|wfh|anywhere|worldwide|telecommute|distributed team)\b").unwrap()
});
static INTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(intern|internship|trainee)\b").unwrap());
static LEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(lead|principal|staff|head of|director|architect)\b").unwrap());
static SENIOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(senior|sr)\b").unwrap());
static JUNIOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(junior|jr|entry[- ]level|graduate|associate)\b").unwrap());
static CONTRACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(contract|contractor|freelance|temporary)\b").unwrap());
static PART_TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bpart[- ]?time\b").unwrap());
static HYBRID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bhybrid\b").unwrap());

/// Strips markup and entities, then collapses whitespace runs to one space.
pub fn clean_text(input: &str) -> String {
    if !input.contains('<') && !input.contains('&') {
        return collapse_whitespace(input);
    }
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => out.push(' '),
            _ => {}
        }
    }
    collapse_whitespace(&out)
}

fn collapse_whitespace(input: &str) -> String {
    WHITESPACE.replace_all(input.trim(), " ").into_owned()
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// Skills mentioned in free text, in vocabulary order.
pub fn infer_skills(text: &str) -> Vec<String> {
    SKILL_PATTERNS
        .iter()
        .filter(|(display, re)| re.is_match(text) || (*display == "Go" && GO_LANGUAGE.is_match(text)))
        .map(|(display, _)| display.to_string())
        .collect()
}

/// Maps a provider tag onto the vocabulary display name when it is a known alias.
pub fn canonical_skill(tag: &str) -> String {
    let trimmed = tag.trim();
    let lower = trimmed.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .find(|(display, aliases)| display.to_lowercase() == lower || aliases.contains(&lower.as_str()))
        .map(|(display, _)| display.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Provider tags first, then inferred skills; case-insensitively unique, capped.
pub fn merge_skills(tags: &[String], inferred: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let candidates = tags.iter().map(|t| canonical_skill(t)).chain(inferred);
    for skill in candidates {
        if out.len() == MAX_SKILLS {
            break;
        }
        if skill.is_empty() || !seen.insert(skill.to_lowercase()) {
            continue;
        }
        out.push(skill);
    }
    out
}

pub fn infer_seniority(title: &str) -> Seniority {
    if INTERN.is_match(title) {
        Seniority::Intern
    } else if LEAD.is_match(title) {
        Seniority::Lead
    } else if SENIOR.is_match(title) {
        Seniority::Senior
    } else if JUNIOR.is_match(title) {
        Seniority::Junior
    } else {
        Seniority::Mid
    }
}

/// Provider level labels such as "Senior Level" or "Entry Level".
pub fn seniority_from_level(level: &str) -> Option<Seniority> {
    let lower = level.to_lowercase();
    if lower.contains("intern") {
        Some(Seniority::Intern)
    } else if lower.contains("entry") || lower.contains("junior") {
        Some(Seniority::Junior)
    } else if lower.contains("senior") {
        Some(Seniority::Senior)
    } else if lower.contains("management") || lower.contains("lead") {
        Some(Seniority::Lead)
    } else if lower.contains("mid") {
        Some(Seniority::Mid)
    } else {
        None
    }
}

pub fn infer_remote(flag: Option<bool>, texts: &[&str]) -> bool {
    flag == Some(true) || texts.iter().any(|t| REMOTE.is_match(t))
}

pub fn normalize_employment_type(raw: &str) -> Option<EmploymentType> {
    let squashed: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let ty = match squashed.as_str() {
        "" => return None,
        s if s.contains("intern") => EmploymentType::Internship,
        s if s.contains("parttime") => EmploymentType::PartTime,
        s if s.contains("fulltime") || s == "permanent" => EmploymentType::FullTime,
        s if s.contains("contract") || s.contains("freelance") || s.contains("temporary") => EmploymentType::Contract,
        s if s.contains("hybrid") => EmploymentType::Hybrid,
        s if s.contains("remote") => EmploymentType::Remote,
        _ => return None,
    };
    Some(ty)
}

/// Fallback when the provider gave no usable type.
pub fn infer_employment_type(title: &str, description: &str, remote: bool) -> EmploymentType {
    let text = format!("{title} {description}");
    if INTERN.is_match(&text) {
        EmploymentType::Internship
    } else if CONTRACT.is_match(&text) {
        EmploymentType::Contract
    } else if PART_TIME.is_match(&text) {
        EmploymentType::PartTime
    } else if HYBRID.is_match(&text) {
        EmploymentType::Hybrid
    } else if remote {
        EmploymentType::Remote
    } else {
        EmploymentType::FullTime
    }
}

/// Annualized salary bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

impl SalaryRange {
    fn ordered(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayPeriod {
    Hourly,
    Monthly,
    Yearly,
}

impl PayPeriod {
    pub fn detect(text: &str) -> Self {
        if HOURLY.is_match(text) {
            Self::Hourly
        } else if MONTHLY.is_match(text) {
            Self::Monthly
        } else {
            Self::Yearly
        }
    }

    pub fn annualize(self, amount: f64) -> f64 {
        match self {
            Self::Hourly => amount * HOURS_PER_YEAR,
            Self::Monthly => amount * 12.0,
            Self::Yearly => amount,
        }
    }
}

/// Reads the first one or two amounts out of a salary string such as
/// `"$90k - $120k"` or `"$45/hour"`.
pub fn extract_salary_range(text: &str) -> Option<SalaryRange> {
    let period = PayPeriod::detect(text);
    let amounts: Vec<f64> = AMOUNT
        .captures_iter(text)
        .filter_map(|caps| {
            let value: f64 = caps[1].replace(',', "").parse().ok()?;
            let value = if caps.get(2).is_some() { value * 1000.0 } else { value };
            Some(period.annualize(value))
        })
        .filter(|v| *v >= MIN_ANNUAL_SALARY)
        .take(2)
        .collect();
    match amounts[..] {
        [one] => Some(SalaryRange::ordered(one, one)),
        [a, b] => Some(SalaryRange::ordered(a, b)),
        _ => None,
    }
}

/// Structured provider bounds; zero means "not given".
pub fn numeric_salary_range(min: Option<f64>, max: Option<f64>) -> Option<SalaryRange> {
    let annualize = |v: f64| if v < HOURLY_CEILING { v * HOURS_PER_YEAR } else { v };
    let min = min.filter(|v| *v > 0.0).map(annualize);
    let max = max.filter(|v| *v > 0.0).map(annualize);
    match (min, max) {
        (Some(a), Some(b)) => Some(SalaryRange::ordered(a, b)),
        (Some(v), None) | (None, Some(v)) => Some(SalaryRange::ordered(v, v)),
        (None, None) => None,
    }
}

pub fn format_salary(range: Option<SalaryRange>) -> String {
    match range {
        None => DEFAULT_SALARY.to_string(),
        Some(r) if (r.max - r.min).abs() < 0.5 => format!("${}", with_commas(r.min)),
        Some(r) => format!("${} - ${}", with_commas(r.min), with_commas(r.max)),
    }
}

fn with_commas(amount: f64) -> String {
    let digits = (amount.round() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Accepts RFC 3339, naive ISO date-times (read as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn from_epoch_seconds(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

pub fn posted_ago(posted_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(posted_at) = posted_at else {
        return DEFAULT_POSTED_AGO.to_string();
    };
    let age = now.signed_duration_since(posted_at);
    let hours = age.num_hours();
    let days = age.num_days();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else if days < 30 {
        plural(days / 7, "week")
    } else {
        plural(days / 30, "month")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

pub fn priority(seniority: Seniority, salary: Option<SalaryRange>) -> Priority {
    let top = salary.map(|s| s.max).unwrap_or(0.0);
    if matches!(seniority, Seniority::Senior | Seniority::Lead) || top >= HIGH_PRIORITY_SALARY {
        Priority::High
    } else if seniority == Seniority::Mid || top >= MEDIUM_PRIORITY_SALARY {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn clean_text_strips_markup_and_entities() {
        assert_eq!(
            clean_text("<p>APIs with Python &amp; Django.</p><ul><li>AWS</li><li>PostgreSQL</li></ul>"),
            "APIs with Python & Django. AWS PostgreSQL"
        );
        assert_eq!(clean_text("systems in <b>Go</b>. Done"), "systems in Go. Done");
        assert_eq!(clean_text("  plain\n\ttext  "), "plain text");
        assert_eq!(clean_text("React&nbsp;and TS"), "React and TS");
    }

    #[test]
    fn truncation_respects_the_cap() {
        let long = "word ".repeat(1000);
        let cut = truncate_chars(&long, MAX_DESCRIPTION_CHARS);
        assert!(cut.chars().count() <= MAX_DESCRIPTION_CHARS);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn skills_vocabulary_matches_on_word_edges() {
        assert_eq!(
            infer_skills("Rust and Python services on AWS with Docker"),
            vec!["Rust", "Python", "AWS", "Docker"]
        );
        assert_eq!(infer_skills("JavaScript only"), vec!["JavaScript"]);
        assert_eq!(infer_skills("Node.js backend"), vec!["Node.js"]);
        assert_eq!(infer_skills("C++ and C# shops"), vec!["C++", "C#"]);
        assert!(infer_skills("HTML").iter().all(|s| s != "Machine Learning"));
        assert!(infer_skills("we use github").is_empty());
    }

    #[test]
    fn go_needs_language_context() {
        assert_eq!(infer_skills("Design distributed systems in Go. Docker too"), vec!["Go", "Docker"]);
        assert_eq!(infer_skills("Linux, Go and Prometheus"), vec!["Go", "Linux"]);
        assert_eq!(infer_skills("Senior Go Developer"), vec!["Go"]);
        assert_eq!(infer_skills("golang microservices"), vec!["Go"]);
        assert!(infer_skills("Be the go-to person for clients on the go").is_empty());
        assert!(infer_skills("Go to market fast and ready, set, Go-live").is_empty());
        assert!(infer_skills("Let's Go!").is_empty());
    }

    #[test]
    fn merged_skills_are_unique_and_capped() {
        let tags = vec!["python".to_string(), "Python".to_string(), "golang".to_string()];
        let merged = merge_skills(&tags, vec!["Python".into(), "Docker".into()]);
        assert_eq!(merged, vec!["Python", "Go", "Docker"]);

        let german = vec!["Übersetzung".to_string(), "übersetzung".to_string(), "ÜBERSETZUNG".to_string()];
        assert_eq!(merge_skills(&german, vec!["Rust".into()]), vec!["Übersetzung", "Rust"]);

        let many: Vec<String> = (0..20).map(|i| format!("skill-{i}")).collect();
        assert_eq!(merge_skills(&many, Vec::new()).len(), MAX_SKILLS);
    }

    #[test]
    fn seniority_from_title_cues() {
        assert_eq!(infer_seniority("Software Engineering Intern"), Seniority::Intern);
        assert_eq!(infer_seniority("Lead Site Reliability Engineer"), Seniority::Lead);
        assert_eq!(infer_seniority("Senior Rust Engineer"), Seniority::Senior);
        assert_eq!(infer_seniority("Sr. Data Analyst"), Seniority::Senior);
        assert_eq!(infer_seniority("Junior Frontend Developer"), Seniority::Junior);
        assert_eq!(infer_seniority("Backend Developer"), Seniority::Mid);
        assert_eq!(seniority_from_level("Senior Level"), Some(Seniority::Senior));
        assert_eq!(seniority_from_level("Entry Level"), Some(Seniority::Junior));
        assert_eq!(seniority_from_level("whatever"), None);
    }

    #[test]
    fn remote_flag_or_keyword() {
        assert!(infer_remote(Some(true), &["Berlin"]));
        assert!(infer_remote(None, &["", "Work from home. Linux"]));
        assert!(infer_remote(Some(false), &["Remote-first team"]));
        assert!(!infer_remote(Some(false), &["Munich", "office role"]));
    }

    #[test]
    fn employment_type_vocabulary() {
        assert_eq!(normalize_employment_type("full_time"), Some(EmploymentType::FullTime));
        assert_eq!(normalize_employment_type("Full Time"), Some(EmploymentType::FullTime));
        assert_eq!(normalize_employment_type("part_time"), Some(EmploymentType::PartTime));
        assert_eq!(normalize_employment_type("contract"), Some(EmploymentType::Contract));
        assert_eq!(normalize_employment_type("Internship"), Some(EmploymentType::Internship));
        assert_eq!(normalize_employment_type(""), None);
        assert_eq!(normalize_employment_type("external"), None);

        assert_eq!(
            infer_employment_type("Data Engineer", "six month contract", false),
            EmploymentType::Contract
        );
        assert_eq!(
            infer_employment_type("ML Scientist", "Hybrid schedule", false),
            EmploymentType::Hybrid
        );
        assert_eq!(infer_employment_type("SRE", "on-call", true), EmploymentType::Remote);
        assert_eq!(infer_employment_type("SRE", "on-call", false), EmploymentType::FullTime);
    }

    #[test]
    fn salary_strings_are_annualized() {
        assert_eq!(
            extract_salary_range("$90k - $120k"),
            Some(SalaryRange { min: 90_000.0, max: 120_000.0 })
        );
        assert_eq!(
            extract_salary_range("$95,000 - $125,000"),
            Some(SalaryRange { min: 95_000.0, max: 125_000.0 })
        );
        assert_eq!(
            extract_salary_range("$45 per hour"),
            Some(SalaryRange { min: 93_600.0, max: 93_600.0 })
        );
        assert_eq!(
            extract_salary_range("5000 monthly"),
            Some(SalaryRange { min: 60_000.0, max: 60_000.0 })
        );
        assert_eq!(extract_salary_range("USA Only"), None);
        assert_eq!(extract_salary_range(""), None);
    }

    #[test]
    fn numeric_salaries_treat_small_values_as_hourly() {
        assert_eq!(
            numeric_salary_range(Some(25.0), Some(35.0)),
            Some(SalaryRange { min: 52_000.0, max: 72_800.0 })
        );
        assert_eq!(numeric_salary_range(Some(0.0), Some(0.0)), None);
        assert_eq!(
            numeric_salary_range(None, Some(160_000.0)),
            Some(SalaryRange { min: 160_000.0, max: 160_000.0 })
        );
    }

    #[test]
    fn salary_display() {
        assert_eq!(format_salary(None), DEFAULT_SALARY);
        assert_eq!(
            format_salary(Some(SalaryRange { min: 95_000.0, max: 125_000.0 })),
            "$95,000 - $125,000"
        );
        assert_eq!(format_salary(Some(SalaryRange { min: 80_000.0, max: 80_000.0 })), "$80,000");
    }

    #[test]
    fn timestamps_in_provider_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).single().unwrap();
        assert_eq!(parse_timestamp("2026-03-01T09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01T10:30:00+01:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-03-01T00:00:00.0000000"),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single()
        );
        assert_eq!(parse_timestamp("2026-03-01"), Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single());
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(from_epoch_seconds(1_772_431_200), Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).single());
    }

    #[test]
    fn relative_age_strings() {
        let ago = |d: Duration| posted_ago(Some(now() - d), now());
        assert_eq!(posted_ago(None, now()), "Recently");
        assert_eq!(ago(Duration::minutes(5)), "Just now");
        assert_eq!(posted_ago(Some(now() + Duration::hours(2)), now()), "Just now");
        assert_eq!(ago(Duration::hours(1)), "1 hour ago");
        assert_eq!(ago(Duration::hours(5)), "5 hours ago");
        assert_eq!(ago(Duration::hours(30)), "1 day ago");
        assert_eq!(ago(Duration::days(3)), "3 days ago");
        assert_eq!(ago(Duration::days(15)), "2 weeks ago");
        assert_eq!(ago(Duration::days(125)), "4 months ago");
    }

    #[test]
    fn priority_from_seniority_and_pay() {
        assert_eq!(priority(Seniority::Senior, None), Priority::High);
        assert_eq!(
            priority(Seniority::Junior, Some(SalaryRange { min: 100_000.0, max: 130_000.0 })),
            Priority::High
        );
        assert_eq!(priority(Seniority::Mid, None), Priority::Medium);
        assert_eq!(
            priority(Seniority::Junior, Some(SalaryRange { min: 70_000.0, max: 85_000.0 })),
            Priority::Medium
        );
        assert_eq!(priority(Seniority::Intern, None), Priority::Low);
    }
}
