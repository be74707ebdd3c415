//! Source adapter contracts + provider adapter implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobagg_core::{ProviderSchema, RawListing};
use jobagg_http::{FetchError, HttpFetcher};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub mod adzuna;
pub mod arbeitnow;
pub mod jooble;
pub mod remoteok;
pub mod remotive;
pub mod style;
pub mod templates;
pub mod themuse;

pub const CRATE_NAME: &str = "jobagg-adapters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PublicApi,
    KeyedApi,
    /// Fabricates postings locally; output is tagged `<family>-style`.
    Generative,
}

/// Static facts about a source the orchestrator needs before calling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub source_id: &'static str,
    pub kind: SourceKind,
    pub default_priority: u32,
    pub expected_yield: usize,
}

pub const KNOWN_SOURCES: &[SourceDescriptor] = &[
    remotive::DESCRIPTOR,
    arbeitnow::DESCRIPTOR,
    remoteok::DESCRIPTOR,
    themuse::DESCRIPTOR,
    adzuna::DESCRIPTOR,
    jooble::DESCRIPTOR,
    style::LINKEDIN_DESCRIPTOR,
    style::INDEED_DESCRIPTOR,
];

pub fn descriptor_for(source_id: &str) -> Option<SourceDescriptor> {
    KNOWN_SOURCES.iter().find(|d| d.source_id == source_id).copied()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterContext {
    pub run_id: Uuid,
    pub requested_at: DateTime<Utc>,
}

impl AdapterContext {
    pub fn new(requested_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            requested_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchQuery {
    pub keywords: String,
    pub location: String,
    /// Upper bound on returned listings.
    pub limit: usize,
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed {source_id} response: {message}")]
    Malformed { source_id: String, message: String },
    #[error("{source_id} disabled: missing {missing}")]
    MissingCredentials {
        source_id: String,
        missing: &'static str,
    },
    #[error("no adapter registered for {0}")]
    UnknownSource(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AdapterError {
    pub fn malformed(source_id: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn descriptor(&self) -> SourceDescriptor;

    fn source_id(&self) -> &'static str {
        self.descriptor().source_id
    }

    /// One call, no retries. Transport, auth and parse failures come back as
    /// errors; an empty vector means the provider had nothing to offer.
    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError>;
}

/// Pure half of an HTTP adapter: provider body in, raw listings out.
pub trait ResponseParser: Send + Sync {
    fn parse_response(
        &self,
        body: &[u8],
        ctx: &AdapterContext,
        query: &FetchQuery,
    ) -> Result<Vec<RawListing>, AdapterError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub adzuna_country: Option<String>,
    pub jooble_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdapterDeps {
    pub http: Arc<HttpFetcher>,
    pub credentials: ProviderCredentials,
    /// Seed for the generative adapters; entropy-seeded when absent.
    pub style_seed: Option<u64>,
}

pub fn adapter_for_source(source_id: &str, deps: &AdapterDeps) -> Result<Box<dyn SourceAdapter>, AdapterError> {
    match source_id {
        remotive::SOURCE_ID => Ok(Box::new(remotive::RemotiveAdapter::new(deps.http.clone()))),
        arbeitnow::SOURCE_ID => Ok(Box::new(arbeitnow::ArbeitnowAdapter::new(deps.http.clone()))),
        remoteok::SOURCE_ID => Ok(Box::new(remoteok::RemoteOkAdapter::new(deps.http.clone()))),
        themuse::SOURCE_ID => Ok(Box::new(themuse::TheMuseAdapter::new(deps.http.clone()))),
        adzuna::SOURCE_ID => Ok(Box::new(adzuna::AdzunaAdapter::from_credentials(
            deps.http.clone(),
            &deps.credentials,
        )?)),
        jooble::SOURCE_ID => Ok(Box::new(jooble::JoobleAdapter::from_credentials(
            deps.http.clone(),
            &deps.credentials,
        )?)),
        style::LINKEDIN_SOURCE_ID => Ok(Box::new(style::StyleGeneratorAdapter::linkedin(deps.style_seed))),
        style::INDEED_SOURCE_ID => Ok(Box::new(style::StyleGeneratorAdapter::indeed(deps.style_seed))),
        other => Err(AdapterError::UnknownSource(other.to_string())),
    }
}

fn parser_for_source(source_id: &str) -> Option<Box<dyn ResponseParser>> {
    match source_id {
        remotive::SOURCE_ID => Some(Box::new(remotive::RemotiveParser)),
        arbeitnow::SOURCE_ID => Some(Box::new(arbeitnow::ArbeitnowParser)),
        remoteok::SOURCE_ID => Some(Box::new(remoteok::RemoteOkParser)),
        themuse::SOURCE_ID => Some(Box::new(themuse::TheMuseParser)),
        adzuna::SOURCE_ID => Some(Box::new(adzuna::AdzunaParser)),
        jooble::SOURCE_ID => Some(Box::new(jooble::JoobleParser)),
        _ => None,
    }
}

/// Offline variant of an HTTP adapter: answers every call from a recorded
/// provider response on disk instead of the network.
pub struct ReplayAdapter {
    descriptor: SourceDescriptor,
    parser: Box<dyn ResponseParser>,
    body_path: PathBuf,
}

#[async_trait]
impl SourceAdapter for ReplayAdapter {
    fn descriptor(&self) -> SourceDescriptor {
        self.descriptor
    }

    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError> {
        let body = load_fixture_body(&self.body_path).await?;
        self.parser.parse_response(&body, ctx, query)
    }
}

/// Generative sources have nothing to replay and are returned live.
pub fn replay_adapter_for_source(
    source_id: &str,
    fixtures_root: &Path,
    deps: &AdapterDeps,
) -> Result<Box<dyn SourceAdapter>, AdapterError> {
    let descriptor = descriptor_for(source_id).ok_or_else(|| AdapterError::UnknownSource(source_id.to_string()))?;
    if descriptor.kind == SourceKind::Generative {
        return adapter_for_source(source_id, deps);
    }
    let parser = parser_for_source(source_id).ok_or_else(|| AdapterError::UnknownSource(source_id.to_string()))?;
    Ok(Box::new(ReplayAdapter {
        descriptor,
        parser,
        body_path: fixture_body_path(fixtures_root, source_id),
    }))
}

pub fn fixture_body_path(fixtures_root: &Path, source_id: &str) -> PathBuf {
    fixtures_root.join(source_id).join("sample").join("response.json")
}

pub async fn load_fixture_body(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    tokio::fs::read(path)
        .await
        .with_context(|| format!("reading fixture {}", path.display()))
}

pub(crate) fn parse_json_body(source_id: &str, body: &[u8]) -> Result<JsonValue, AdapterError> {
    serde_json::from_slice(body).map_err(|e| AdapterError::malformed(source_id, format!("invalid JSON: {e}")))
}

pub(crate) fn array_at<'a>(source_id: &str, value: &'a JsonValue, key: &str) -> Result<&'a Vec<JsonValue>, AdapterError> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| AdapterError::malformed(source_id, format!("missing `{key}` array")))
}

/// Lenient client-side filter for providers without server-side search:
/// any keyword token of two or more characters found in `haystack` matches.
pub fn matches_keywords(haystack: &str, keywords: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let mut tokens = keywords
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| t.chars().count() >= 2)
        .peekable();
    if tokens.peek().is_none() {
        return true;
    }
    tokens.any(|t| haystack.contains(&t))
}

pub(crate) fn is_remote_location(location: &str) -> bool {
    let lower = location.trim().to_lowercase();
    lower.is_empty() || lower == "remote" || lower == "anywhere"
}

pub(crate) fn into_raw_listings(
    source_id: &str,
    schema: ProviderSchema,
    ctx: &AdapterContext,
    items: impl IntoIterator<Item = JsonValue>,
    limit: usize,
) -> Vec<RawListing> {
    let listings: Vec<RawListing> = items
        .into_iter()
        .take(limit)
        .map(|payload| RawListing::new(source_id, schema, ctx.requested_at, payload))
        .collect();
    debug!(source_id, limit, parsed = listings.len(), "parsed provider response");
    listings
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    pub fn workspace_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .canonicalize()
            .expect("workspace root")
    }

    pub fn fixture(source_id: &str) -> Vec<u8> {
        std::fs::read(fixture_body_path(&workspace_root().join("fixtures"), source_id)).expect("fixture body")
    }

    pub fn ctx() -> AdapterContext {
        AdapterContext {
            run_id: Uuid::nil(),
            requested_at: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).single().unwrap(),
        }
    }

    pub fn query(keywords: &str, location: &str, limit: usize) -> FetchQuery {
        FetchQuery {
            keywords: keywords.to_string(),
            location: location.to_string(),
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use jobagg_http::HttpClientConfig;

    fn deps(credentials: ProviderCredentials) -> AdapterDeps {
        AdapterDeps {
            http: Arc::new(HttpFetcher::new(HttpClientConfig::default()).unwrap()),
            credentials,
            style_seed: Some(7),
        }
    }

    #[test]
    fn keyword_filter_is_case_insensitive_and_lenient() {
        assert!(matches_keywords("Senior RUST Engineer", "rust developer"));
        assert!(!matches_keywords("Marketing Manager", "rust developer"));
        assert!(matches_keywords("anything", "   "));
        assert!(matches_keywords("anything", "a"));
    }

    #[test]
    fn every_known_source_has_an_adapter_or_a_credential_error() {
        let deps = deps(ProviderCredentials::default());
        for descriptor in KNOWN_SOURCES {
            match adapter_for_source(descriptor.source_id, &deps) {
                Ok(adapter) => assert_eq!(adapter.source_id(), descriptor.source_id),
                Err(AdapterError::MissingCredentials { source_id, .. }) => {
                    assert_eq!(descriptor.kind, SourceKind::KeyedApi);
                    assert_eq!(source_id, descriptor.source_id);
                }
                Err(other) => panic!("unexpected error for {}: {other}", descriptor.source_id),
            }
        }
    }

    #[test]
    fn keyed_sources_build_once_credentials_are_present() {
        let deps = deps(ProviderCredentials {
            adzuna_app_id: Some("id".into()),
            adzuna_app_key: Some("key".into()),
            adzuna_country: None,
            jooble_api_key: Some("jooble".into()),
        });
        assert!(adapter_for_source("adzuna", &deps).is_ok());
        assert!(adapter_for_source("jooble", &deps).is_ok());
        assert!(matches!(
            adapter_for_source("monster", &deps),
            Err(AdapterError::UnknownSource(_))
        ));
    }

    #[tokio::test]
    async fn replay_adapter_answers_from_recorded_fixture() {
        let deps = deps(ProviderCredentials::default());
        let fixtures = workspace_root().join("fixtures");
        let adapter = replay_adapter_for_source("remotive", &fixtures, &deps).unwrap();
        let listings = adapter.fetch(&ctx(), &query("developer", "", 2)).await.unwrap();
        assert_eq!(listings.len(), 2);
        assert!(listings.iter().all(|l| l.source_id == "remotive"));

        // keyed sources replay without credentials
        let adzuna = replay_adapter_for_source("adzuna", &fixtures, &deps).unwrap();
        assert!(!adzuna.fetch(&ctx(), &query("developer", "", 10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replay_adapter_reports_missing_fixture_as_error() {
        let deps = deps(ProviderCredentials::default());
        let adapter = replay_adapter_for_source("remotive", Path::new("/nonexistent"), &deps).unwrap();
        let err = adapter.fetch(&ctx(), &query("developer", "", 2)).await.unwrap_err();
        assert!(matches!(err, AdapterError::Anyhow(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn replay_reads_the_fixture_on_every_call() {
        let deps = deps(ProviderCredentials::default());
        let dir = tempfile::tempdir().unwrap();
        let body_path = fixture_body_path(dir.path(), "remotive");
        tokio::fs::create_dir_all(body_path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&body_path, fixture("remotive")).await.unwrap();

        let adapter = replay_adapter_for_source("remotive", dir.path(), &deps).unwrap();
        let (ctx_a, query_a) = (ctx(), query("developer", "", 2));
        let (ctx_b, query_b) = (ctx(), query("developer", "", 2));
        let (a, b) = tokio::join!(
            adapter.fetch(&ctx_a, &query_a),
            adapter.fetch(&ctx_b, &query_b),
        );
        assert_eq!(a.unwrap().len(), 2);
        assert_eq!(b.unwrap().len(), 2);

        tokio::fs::write(&body_path, br#"{"jobs": []}"#).await.unwrap();
        assert!(adapter.fetch(&ctx(), &query("developer", "", 2)).await.unwrap().is_empty());
    }
}
