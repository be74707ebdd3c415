//! Adzuna search API. Requires an application id and key.

use std::sync::Arc;

use async_trait::async_trait;
use jobagg_core::{ProviderSchema, RawListing};
use jobagg_http::HttpFetcher;

use crate::{
    array_at, into_raw_listings, is_remote_location, parse_json_body, AdapterContext, AdapterError, FetchQuery,
    ProviderCredentials, ResponseParser, SourceAdapter, SourceDescriptor, SourceKind,
};

pub const SOURCE_ID: &str = "adzuna";
const BASE_URL: &str = "https://api.adzuna.com/v1/api/jobs";
const DEFAULT_COUNTRY: &str = "us";
const MAX_RESULTS_PER_PAGE: usize = 50;

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    source_id: SOURCE_ID,
    kind: SourceKind::KeyedApi,
    default_priority: 50,
    expected_yield: 20,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct AdzunaParser;

impl ResponseParser for AdzunaParser {
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
            ProviderSchema::Adzuna,
            ctx,
            results.iter().cloned(),
            query.limit,
        ))
    }
}

pub struct AdzunaAdapter {
    http: Arc<HttpFetcher>,
    base_url: String,
    app_id: String,
    app_key: String,
    country: String,
}

impl AdzunaAdapter {
    pub fn from_credentials(http: Arc<HttpFetcher>, credentials: &ProviderCredentials) -> Result<Self, AdapterError> {
        let app_id = non_empty(credentials.adzuna_app_id.as_deref()).ok_or(AdapterError::MissingCredentials {
            source_id: SOURCE_ID.to_string(),
            missing: "ADZUNA_APP_ID",
        })?;
        let app_key = non_empty(credentials.adzuna_app_key.as_deref()).ok_or(AdapterError::MissingCredentials {
            source_id: SOURCE_ID.to_string(),
            missing: "ADZUNA_APP_KEY",
        })?;
        let country = non_empty(credentials.adzuna_country.as_deref())
            .unwrap_or(DEFAULT_COUNTRY)
            .to_ascii_lowercase();
        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
            app_id: app_id.to_string(),
            app_key: app_key.to_string(),
            country,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/{}/search/1", self.base_url, self.country)
    }

    fn request_params(&self, query: &FetchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("app_id", self.app_id.clone()),
            ("app_key", self.app_key.clone()),
            ("what", query.keywords.clone()),
            ("results_per_page", query.limit.clamp(1, MAX_RESULTS_PER_PAGE).to_string()),
            ("content-type", "application/json".to_string()),
        ];
        if !is_remote_location(&query.location) {
            params.push(("where", query.location.trim().to_string()));
        }
        params
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl SourceAdapter for AdzunaAdapter {
    fn descriptor(&self) -> SourceDescriptor {
        DESCRIPTOR
    }

    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError> {
        let params = self.request_params(query);
        let resp = self
            .http
            .get_bytes(ctx.run_id, SOURCE_ID, &self.search_url(), &params)
            .await?;
        AdzunaParser.parse_response(&resp.body, ctx, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, fixture, query};
    use jobagg_core::json_str;
    use jobagg_http::HttpClientConfig;

    fn http() -> Arc<HttpFetcher> {
        Arc::new(HttpFetcher::new(HttpClientConfig::default()).unwrap())
    }

    #[test]
    fn parses_results_with_nested_company() {
        let listings = AdzunaParser
            .parse_response(&fixture(SOURCE_ID), &ctx(), &query("developer", "", 10))
            .unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(
            json_str(&listings[0].payload, &["company", "display_name"]),
            Some("Northwind Traders")
        );
    }

    #[test]
    fn blank_credentials_disable_the_adapter() {
        let creds = ProviderCredentials {
            adzuna_app_id: Some("  ".into()),
            adzuna_app_key: Some("key".into()),
            ..Default::default()
        };
        let err = AdzunaAdapter::from_credentials(http(), &creds).err().unwrap();
        assert!(matches!(err, AdapterError::MissingCredentials { missing: "ADZUNA_APP_ID", .. }));
    }

    #[test]
    fn request_targets_country_and_skips_remote_location() {
        let creds = ProviderCredentials {
            adzuna_app_id: Some("id".into()),
            adzuna_app_key: Some("key".into()),
            adzuna_country: Some("GB".into()),
            ..Default::default()
        };
        let adapter = AdzunaAdapter::from_credentials(http(), &creds).unwrap();
        assert_eq!(adapter.search_url(), "https://api.adzuna.com/v1/api/jobs/gb/search/1");

        let params = adapter.request_params(&query("rust", "Remote", 500));
        assert!(params.contains(&("results_per_page", "50".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "where"));

        let params = adapter.request_params(&query("rust", "London", 5));
        assert!(params.contains(&("where", "London".to_string())));
    }
}
