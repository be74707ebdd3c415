//! Jooble REST API: POST search with the API key in the path.

use std::sync::Arc;

use async_trait::async_trait;
use jobagg_core::{ProviderSchema, RawListing};
use jobagg_http::HttpFetcher;
use serde::Serialize;

use crate::{
    array_at, into_raw_listings, is_remote_location, parse_json_body, AdapterContext, AdapterError, FetchQuery,
    ProviderCredentials, ResponseParser, SourceAdapter, SourceDescriptor, SourceKind,
};

pub const SOURCE_ID: &str = "jooble";
const BASE_URL: &str = "https://jooble.org/api";

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    source_id: SOURCE_ID,
    kind: SourceKind::KeyedApi,
    default_priority: 60,
    expected_yield: 20,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct JoobleRequest {
    keywords: String,
    location: String,
    page: String,
    #[serde(rename = "ResultOnPage")]
    result_on_page: String,
}

impl JoobleRequest {
    fn from_query(query: &FetchQuery) -> Self {
        let location = if is_remote_location(&query.location) {
            "Remote".to_string()
        } else {
            query.location.trim().to_string()
        };
        Self {
            keywords: query.keywords.clone(),
            location,
            page: "1".to_string(),
            result_on_page: query.limit.max(1).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JoobleParser;

impl ResponseParser for JoobleParser {
    fn parse_response(
        &self,
        body: &[u8],
        ctx: &AdapterContext,
        query: &FetchQuery,
    ) -> Result<Vec<RawListing>, AdapterError> {
        let value = parse_json_body(SOURCE_ID, body)?;
        let jobs = array_at(SOURCE_ID, &value, "jobs")?;
        Ok(into_raw_listings(
            SOURCE_ID,
            ProviderSchema::Jooble,
            ctx,
            jobs.iter().cloned(),
            query.limit,
        ))
    }
}

pub struct JoobleAdapter {
    http: Arc<HttpFetcher>,
    base_url: String,
    api_key: String,
}

impl JoobleAdapter {
    pub fn from_credentials(http: Arc<HttpFetcher>, credentials: &ProviderCredentials) -> Result<Self, AdapterError> {
        let api_key = credentials
            .jooble_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AdapterError::MissingCredentials {
                source_id: SOURCE_ID.to_string(),
                missing: "JOOBLE_API_KEY",
            })?;
        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl SourceAdapter for JoobleAdapter {
    fn descriptor(&self) -> SourceDescriptor {
        DESCRIPTOR
    }

    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError> {
        let url = format!("{}/{}", self.base_url, self.api_key);
        let resp = self
            .http
            .post_json(ctx.run_id, SOURCE_ID, &url, &JoobleRequest::from_query(query))
            .await?;
        JoobleParser.parse_response(&resp.body, ctx, query)
    }
}
