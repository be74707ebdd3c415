//! The Muse public jobs API. Location is filtered server side; the API has no
//! free-text search, so keywords are matched against job names and categories.

use std::sync::Arc;

use async_trait::async_trait;
use jobagg_core::{json_str, ProviderSchema, RawListing};
use jobagg_http::HttpFetcher;
use serde_json::Value as JsonValue;

use crate::{
    array_at, into_raw_listings, is_remote_location, matches_keywords, parse_json_body, AdapterContext,
    AdapterError, FetchQuery, ResponseParser, SourceAdapter, SourceDescriptor, SourceKind,
};

pub const SOURCE_ID: &str = "themuse";
const BASE_URL: &str = "https://www.themuse.com/api/public/jobs";
const REMOTE_LOCATION: &str = "Flexible / Remote";

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    source_id: SOURCE_ID,
    kind: SourceKind::PublicApi,
    default_priority: 40,
    expected_yield: 20,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TheMuseParser;

fn keep(item: &JsonValue, query: &FetchQuery) -> bool {
    let name = json_str(item, &["name"]).unwrap_or_default();
    let categories = item
        .get("categories")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|c| json_str(c, &["name"]))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    matches_keywords(&format!("{name} {categories}"), &query.keywords)
}

impl ResponseParser for TheMuseParser {
    fn parse_response(
        &self,
        body: &[u8],
        ctx: &AdapterContext,
        query: &FetchQuery,
    ) -> Result<Vec<RawListing>, AdapterError> {
        let value = parse_json_body(SOURCE_ID, body)?;
        let results = array_at(SOURCE_ID, &value, "results")?;
        Ok(into_raw_listings(
            SOURCE_ID,
            ProviderSchema::TheMuse,
            ctx,
            results.iter().filter(|item| keep(item, query)).cloned(),
            query.limit,
        ))
    }
}

pub struct TheMuseAdapter {
    http: Arc<HttpFetcher>,
    base_url: String,
}

impl TheMuseAdapter {
    pub fn new(http: Arc<HttpFetcher>) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
        }
    }
}

fn request_params(query: &FetchQuery) -> Vec<(&'static str, String)> {
    let location = if is_remote_location(&query.location) {
        REMOTE_LOCATION.to_string()
    } else {
        query.location.trim().to_string()
    };
    vec![("page", "0".to_string()), ("location", location)]
}

#[async_trait]
impl SourceAdapter for TheMuseAdapter {
    fn descriptor(&self) -> SourceDescriptor {
        DESCRIPTOR
    }

    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError> {
        let params = request_params(query);
        let resp = self
            .http
            .get_bytes(ctx.run_id, SOURCE_ID, &self.base_url, &params)
            .await?;
        TheMuseParser.parse_response(&resp.body, ctx, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, fixture, query};

    #[test]
    fn matches_keywords_against_categories() {
        let listings = TheMuseParser
            .parse_response(&fixture(SOURCE_ID), &ctx(), &query("data science", "", 10))
            .unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(json_str(&listings[0].payload, &["name"]), Some("Machine Learning Scientist"));
    }

    #[test]
    fn remote_requests_ask_for_flexible_locations() {
        let params = request_params(&query("rust", "Remote", 5));
        assert!(params.contains(&("location", REMOTE_LOCATION.to_string())));
        let params = request_params(&query("rust", " Boston, MA ", 5));
        assert!(params.contains(&("location", "Boston, MA".to_string())));
    }
}
