//! RemoteOK JSON feed. The response is a bare array whose first element is a
//! legal notice rather than a posting; search happens client side.

use std::sync::Arc;

use async_trait::async_trait;
use jobagg_core::{json_id, json_str, json_string_vec, ProviderSchema, RawListing};
use jobagg_http::HttpFetcher;
use serde_json::Value as JsonValue;

use crate::{
    into_raw_listings, matches_keywords, parse_json_body, AdapterContext, AdapterError, FetchQuery, ResponseParser,
    SourceAdapter, SourceDescriptor, SourceKind,
};

pub const SOURCE_ID: &str = "remoteok";
const BASE_URL: &str = "https://remoteok.com/api";

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    source_id: SOURCE_ID,
    kind: SourceKind::PublicApi,
    default_priority: 30,
    expected_yield: 20,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteOkParser;

fn is_posting(item: &JsonValue) -> bool {
    item.get("legal").is_none() && json_id(item, &["id"]).is_some()
}

fn keep(item: &JsonValue, query: &FetchQuery) -> bool {
    let position = json_str(item, &["position"]).unwrap_or_default();
    let tags = json_string_vec(item, &["tags"]).unwrap_or_default().join(" ");
    matches_keywords(&format!("{position} {tags}"), &query.keywords)
}

impl ResponseParser for RemoteOkParser {
    fn parse_response(
        &self,
        body: &[u8],
        ctx: &AdapterContext,
        query: &FetchQuery,
    ) -> Result<Vec<RawListing>, AdapterError> {
        let value = parse_json_body(SOURCE_ID, body)?;
        let items = value
            .as_array()
            .ok_or_else(|| AdapterError::malformed(SOURCE_ID, "expected a top-level array"))?;
        Ok(into_raw_listings(
            SOURCE_ID,
            ProviderSchema::RemoteOk,
            ctx,
            items
                .iter()
                .filter(|item| is_posting(item) && keep(item, query))
                .cloned(),
            query.limit,
        ))
    }
}

pub struct RemoteOkAdapter {
    http: Arc<HttpFetcher>,
    base_url: String,
}

impl RemoteOkAdapter {
    pub fn new(http: Arc<HttpFetcher>) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkAdapter {
    fn descriptor(&self) -> SourceDescriptor {
        DESCRIPTOR
    }

    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError> {
        let resp = self.http.get_bytes(ctx.run_id, SOURCE_ID, &self.base_url, &[]).await?;
        RemoteOkParser.parse_response(&resp.body, ctx, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, fixture, query};

    #[test]
    fn skips_legal_notice_and_filters_by_tags() {
        let listings = RemoteOkParser
            .parse_response(&fixture(SOURCE_ID), &ctx(), &query("golang", "", 10))
            .unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(json_str(&listings[0].payload, &["company"]), Some("Gopher Works"));
    }

    #[test]
    fn empty_keywords_keep_every_posting() {
        let listings = RemoteOkParser
            .parse_response(&fixture(SOURCE_ID), &ctx(), &query("", "", 10))
            .unwrap();
        assert_eq!(listings.len(), 2);
    }

    #[test]
    fn object_body_is_malformed() {
        let err = RemoteOkParser
            .parse_response(br#"{"error": "blocked"}"#, &ctx(), &query("", "", 10))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Malformed { .. }));
    }
}
