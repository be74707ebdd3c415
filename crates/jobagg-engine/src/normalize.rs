//! Raw provider payloads to canonical [`Job`] records.
//!
//! Each field goes through three stages: provider-specific extraction, shared
//! inference from free text, then a default sentinel. Normalization never
//! fails; a payload with nothing usable still yields a valid job.

use chrono::{DateTime, Utc};
use jobagg_core::{
    json_bool, json_f64, json_id, json_str, json_string_vec, EmploymentType, Job, ProviderSchema, RawListing, Seniority,
    DEFAULT_APPLY_URL, DEFAULT_COMPANY, DEFAULT_DESCRIPTION, DEFAULT_LOCATION, DEFAULT_TITLE,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::infer::{
    clean_text, extract_salary_range, format_salary, from_epoch_seconds, infer_employment_type, infer_remote,
    infer_seniority, infer_skills, merge_skills, normalize_employment_type, numeric_salary_range, parse_timestamp,
    posted_ago, priority, seniority_from_level, truncate_chars, SalaryRange, MAX_DESCRIPTION_CHARS,
};

const REMOTE_LOCATION: &str = "Remote";

/// Request-level facts the normalizer needs besides the payload.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub requested_location: &'a str,
    pub now: DateTime<Utc>,
}

/// Provider fields after extraction, before inference and defaults.
#[derive(Debug, Default)]
struct Extracted {
    id: Option<String>,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
    apply_url: Option<String>,
    salary_text: Option<String>,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    employment_type: Option<String>,
    posted_at: Option<DateTime<Utc>>,
    tags: Vec<String>,
    remote: Option<bool>,
    level: Option<String>,
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(ToString::to_string)
}

fn timestamp_at(payload: &JsonValue, key: &str) -> Option<DateTime<Utc>> {
    match payload.get(key)? {
        JsonValue::String(s) => parse_timestamp(s),
        JsonValue::Number(n) => n.as_i64().and_then(from_epoch_seconds),
        _ => None,
    }
}

fn names_at(payload: &JsonValue, key: &str) -> Vec<String> {
    payload
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| json_str(item, &["name"]).map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn extract(raw: &RawListing) -> Extracted {
    let p = &raw.payload;
    match raw.schema {
        ProviderSchema::Remotive => Extracted {
            id: json_id(p, &["id"]),
            title: owned(json_str(p, &["title"])),
            company: owned(json_str(p, &["company_name"])),
            location: owned(json_str(p, &["candidate_required_location"])),
            description: owned(json_str(p, &["description"])),
            apply_url: owned(json_str(p, &["url"])),
            salary_text: owned(json_str(p, &["salary"])),
            employment_type: owned(json_str(p, &["job_type"])),
            posted_at: timestamp_at(p, "publication_date"),
            tags: json_string_vec(p, &["tags"]).unwrap_or_default(),
            remote: Some(true),
            ..Default::default()
        },
        ProviderSchema::Arbeitnow => Extracted {
            id: json_id(p, &["slug"]),
            title: owned(json_str(p, &["title"])),
            company: owned(json_str(p, &["company_name"])),
            location: owned(json_str(p, &["location"])),
            description: owned(json_str(p, &["description"])),
            apply_url: owned(json_str(p, &["url"])),
            employment_type: json_string_vec(p, &["job_types"]).and_then(|types| types.into_iter().next()),
            posted_at: timestamp_at(p, "created_at"),
            tags: json_string_vec(p, &["tags"]).unwrap_or_default(),
            remote: json_bool(p, &["remote"]),
            ..Default::default()
        },
        ProviderSchema::RemoteOk => Extracted {
            id: json_id(p, &["id"]),
            title: owned(json_str(p, &["position"])),
            company: owned(json_str(p, &["company"])),
            location: owned(json_str(p, &["location"])),
            description: owned(json_str(p, &["description"])),
            apply_url: json_str(p, &["apply_url"])
                .filter(|u| !u.trim().is_empty())
                .or_else(|| json_str(p, &["url"]))
                .map(ToString::to_string),
            salary_min: json_f64(p, &["salary_min"]),
            salary_max: json_f64(p, &["salary_max"]),
            posted_at: timestamp_at(p, "date").or_else(|| timestamp_at(p, "epoch")),
            tags: json_string_vec(p, &["tags"]).unwrap_or_default(),
            remote: Some(true),
            ..Default::default()
        },
        ProviderSchema::TheMuse => {
            let locations = names_at(p, "locations");
            Extracted {
                id: json_id(p, &["id"]),
                title: owned(json_str(p, &["name"])),
                company: owned(json_str(p, &["company", "name"])),
                remote: Some(locations.iter().any(|l| l.to_lowercase().contains("remote"))),
                location: (!locations.is_empty()).then(|| locations.join("; ")),
                description: owned(json_str(p, &["contents"])),
                apply_url: owned(json_str(p, &["refs", "landing_page"])),
                posted_at: timestamp_at(p, "publication_date"),
                level: names_at(p, "levels").into_iter().next(),
                ..Default::default()
            }
        }
        ProviderSchema::Adzuna => {
            let contract_type = json_str(p, &["contract_type"]).filter(|t| t.eq_ignore_ascii_case("contract"));
            Extracted {
                id: json_id(p, &["id"]),
                title: owned(json_str(p, &["title"])),
                company: owned(json_str(p, &["company", "display_name"])),
                location: owned(json_str(p, &["location", "display_name"])),
                description: owned(json_str(p, &["description"])),
                apply_url: owned(json_str(p, &["redirect_url"])),
                salary_min: json_f64(p, &["salary_min"]),
                salary_max: json_f64(p, &["salary_max"]),
                employment_type: owned(contract_type.or_else(|| json_str(p, &["contract_time"]))),
                posted_at: timestamp_at(p, "created"),
                ..Default::default()
            }
        }
        ProviderSchema::Jooble => Extracted {
            id: json_id(p, &["id"]),
            title: owned(json_str(p, &["title"])),
            company: owned(json_str(p, &["company"])),
            location: owned(json_str(p, &["location"])),
            description: owned(json_str(p, &["snippet"])),
            apply_url: owned(json_str(p, &["link"])),
            salary_text: owned(json_str(p, &["salary"])),
            employment_type: owned(json_str(p, &["type"])),
            posted_at: timestamp_at(p, "updated"),
            ..Default::default()
        },
        ProviderSchema::Generated => Extracted {
            id: json_id(p, &["id"]),
            title: owned(json_str(p, &["title"])),
            company: owned(json_str(p, &["company"])),
            location: owned(json_str(p, &["location"])),
            description: owned(json_str(p, &["description"])),
            apply_url: owned(json_str(p, &["apply_url"])),
            salary_text: owned(json_str(p, &["salary"])),
            salary_min: json_f64(p, &["salary_min"]),
            salary_max: json_f64(p, &["salary_max"]),
            employment_type: owned(json_str(p, &["employment_type"])),
            posted_at: timestamp_at(p, "posted_at"),
            tags: json_string_vec(p, &["skills"]).unwrap_or_default(),
            remote: json_bool(p, &["remote"]),
            ..Default::default()
        },
    }
}

fn non_empty_clean(value: Option<&str>) -> Option<String> {
    value.map(clean_text).filter(|v| !v.is_empty())
}

pub fn normalize(raw: &RawListing, ctx: &NormalizeContext<'_>) -> Job {
    let ex = extract(raw);

    let title = non_empty_clean(ex.title.as_deref()).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let company = non_empty_clean(ex.company.as_deref()).unwrap_or_else(|| DEFAULT_COMPANY.to_string());
    let full_description = non_empty_clean(ex.description.as_deref());
    let provider_location = non_empty_clean(ex.location.as_deref());

    let remote = infer_remote(
        ex.remote,
        &[
            provider_location.as_deref().unwrap_or_default(),
            full_description.as_deref().unwrap_or_default(),
        ],
    );

    let location = provider_location.unwrap_or_else(|| {
        let requested = ctx.requested_location.trim();
        if !requested.is_empty() {
            requested.to_string()
        } else if remote {
            REMOTE_LOCATION.to_string()
        } else {
            DEFAULT_LOCATION.to_string()
        }
    });

    let description_text = full_description.as_deref().unwrap_or_default();
    let skills = merge_skills(&ex.tags, infer_skills(&format!("{title} {description_text}")));

    let salary_text = non_empty_clean(ex.salary_text.as_deref());
    let range: Option<SalaryRange> = numeric_salary_range(ex.salary_min, ex.salary_max)
        .or_else(|| salary_text.as_deref().and_then(extract_salary_range));
    let salary = match salary_text {
        Some(text) if text.chars().any(|c| c.is_ascii_digit()) => text,
        _ => format_salary(range),
    };

    let employment_type: EmploymentType = ex
        .employment_type
        .as_deref()
        .and_then(normalize_employment_type)
        .unwrap_or_else(|| infer_employment_type(&title, description_text, remote));

    let seniority = match infer_seniority(&title) {
        Seniority::Mid => ex
            .level
            .as_deref()
            .and_then(seniority_from_level)
            .unwrap_or(Seniority::Mid),
        other => other,
    };

    let apply_url = ex
        .apply_url
        .map(|u| u.trim().to_string())
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
        .unwrap_or_else(|| DEFAULT_APPLY_URL.to_string());

    let id = match ex.id {
        Some(provider_id) => format!("{}-{provider_id}", raw.source_id),
        None => fallback_id(&raw.source_id, &title, &company, &apply_url),
    };

    let description = full_description
        .map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS))
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    Job {
        id,
        title,
        company,
        location,
        description,
        apply_url,
        salary,
        salary_min: range.map(|r| r.min),
        salary_max: range.map(|r| r.max),
        employment_type,
        posted_ago: posted_ago(ex.posted_at, ctx.now),
        skills,
        remote,
        seniority,
        priority: priority(seniority, range),
        source: raw.source_id.clone(),
        match_score: 0,
        salary_score: 0,
        company_score: 0,
    }
}

fn fallback_id(source_id: &str, title: &str, company: &str, apply_url: &str) -> String {
    let name = format!("{title}|{company}|{apply_url}");
    format!("{source_id}-{}", Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
}
