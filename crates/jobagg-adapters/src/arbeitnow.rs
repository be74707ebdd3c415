//! Arbeitnow job board API. The feed has no search parameters, so keyword and
//! location filtering happen client side.

use std::sync::Arc;

use async_trait::async_trait;
use jobagg_core::{json_bool, json_str, json_string_vec, ProviderSchema, RawListing};
use jobagg_http::HttpFetcher;
use serde_json::Value as JsonValue;

use crate::{
    array_at, into_raw_listings, is_remote_location, matches_keywords, parse_json_body, AdapterContext,
    AdapterError, FetchQuery, ResponseParser, SourceAdapter, SourceDescriptor, SourceKind,
};

pub const SOURCE_ID: &str = "arbeitnow";
const BASE_URL: &str = "https://www.arbeitnow.com/api/job-board-api";

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    source_id: SOURCE_ID,
    kind: SourceKind::PublicApi,
    default_priority: 20,
    expected_yield: 20,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ArbeitnowParser;

fn keep(item: &JsonValue, query: &FetchQuery) -> bool {
    let title = json_str(item, &["title"]).unwrap_or_default();
    let tags = json_string_vec(item, &["tags"]).unwrap_or_default().join(" ");
    if !matches_keywords(&format!("{title} {tags}"), &query.keywords) {
        return false;
    }
    if is_remote_location(&query.location) {
        return true;
    }
    let location = json_str(item, &["location"]).unwrap_or_default().to_lowercase();
    json_bool(item, &["remote"]).unwrap_or(false) || location.contains(&query.location.trim().to_lowercase())
}

impl ResponseParser for ArbeitnowParser {
    fn parse_response(
        &self,
        body: &[u8],
        ctx: &AdapterContext,
        query: &FetchQuery,
    ) -> Result<Vec<RawListing>, AdapterError> {
        let value = parse_json_body(SOURCE_ID, body)?;
        let items = array_at(SOURCE_ID, &value, "data")?;
        Ok(into_raw_listings(
            SOURCE_ID,
            ProviderSchema::Arbeitnow,
            ctx,
            items.iter().filter(|item| keep(item, query)).cloned(),
            query.limit,
        ))
    }
}

pub struct ArbeitnowAdapter {
    http: Arc<HttpFetcher>,
    base_url: String,
}

impl ArbeitnowAdapter {
    pub fn new(http: Arc<HttpFetcher>) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for ArbeitnowAdapter {
    fn descriptor(&self) -> SourceDescriptor {
        DESCRIPTOR
    }

    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError> {
        let resp = self.http.get_bytes(ctx.run_id, SOURCE_ID, &self.base_url, &[]).await?;
        ArbeitnowParser.parse_response(&resp.body, ctx, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, fixture, query};

    #[test]
    fn filters_feed_by_keywords() {
        let listings = ArbeitnowParser
            .parse_response(&fixture(SOURCE_ID), &ctx(), &query("backend", "", 10))
            .unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(json_str(&listings[0].payload, &["company_name"]), Some("ACME"));
    }

    #[test]
    fn location_filter_keeps_remote_postings() {
        let listings = ArbeitnowParser
            .parse_response(&fixture(SOURCE_ID), &ctx(), &query("developer", "Munich", 10))
            .unwrap();
        let titles: Vec<_> = listings
            .iter()
            .filter_map(|l| json_str(&l.payload, &["title"]))
            .collect();
        assert_eq!(titles, vec!["backend developer", "Frontend Developer (React)"]);
    }

    #[test]
    fn missing_data_array_is_malformed() {
        let err = ArbeitnowParser
            .parse_response(b"[]", &ctx(), &query("rust", "", 5))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Malformed { .. }));
    }
}
