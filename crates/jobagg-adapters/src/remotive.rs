//! Remotive public remote-jobs API (server-side search).

use std::sync::Arc;

use async_trait::async_trait;
use jobagg_core::{ProviderSchema, RawListing};
use jobagg_http::HttpFetcher;

use crate::{
    array_at, into_raw_listings, parse_json_body, AdapterContext, AdapterError, FetchQuery, ResponseParser,
    SourceAdapter, SourceDescriptor, SourceKind,
};

pub const SOURCE_ID: &str = "remotive";
const BASE_URL: &str = "https://remotive.com/api/remote-jobs";

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    source_id: SOURCE_ID,
    kind: SourceKind::PublicApi,
    default_priority: 10,
    expected_yield: 20,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RemotiveParser;

impl ResponseParser for RemotiveParser {
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
            ProviderSchema::Remotive,
            ctx,
            jobs.iter().cloned(),
            query.limit,
        ))
    }
}

pub struct RemotiveAdapter {
    http: Arc<HttpFetcher>,
    base_url: String,
}

impl RemotiveAdapter {
    pub fn new(http: Arc<HttpFetcher>) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for RemotiveAdapter {
    fn descriptor(&self) -> SourceDescriptor {
        DESCRIPTOR
    }

    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError> {
        let params = [
            ("search", query.keywords.clone()),
            ("limit", query.limit.to_string()),
        ];
        let resp = self
            .http
            .get_bytes(ctx.run_id, SOURCE_ID, &self.base_url, &params)
            .await?;
        RemotiveParser.parse_response(&resp.body, ctx, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, fixture, query};
    use jobagg_core::json_str;

    #[test]
    fn parses_recorded_response_and_respects_limit() {
        let listings = RemotiveParser
            .parse_response(&fixture(SOURCE_ID), &ctx(), &query("developer", "", 2))
            .unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].schema, ProviderSchema::Remotive);
        assert_eq!(json_str(&listings[0].payload, &["company_name"]), Some("Acme"));
    }

    #[test]
    fn rejects_body_without_jobs_array() {
        let err = RemotiveParser
            .parse_response(br#"{"job-count": 0}"#, &ctx(), &query("rust", "", 5))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Malformed { .. }));
    }

    #[test]
    fn empty_jobs_array_is_not_an_error() {
        let listings = RemotiveParser
            .parse_response(br#"{"jobs": []}"#, &ctx(), &query("rust", "", 5))
            .unwrap();
        assert!(listings.is_empty());
    }
}
