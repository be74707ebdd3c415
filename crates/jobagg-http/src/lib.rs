//! Shared HTTP fetch utilities for provider adapters.
//!
//! The fetcher never retries: a failed call is reported once and the
//! orchestrator decides what to do with the source.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

pub const CRATE_NAME: &str = "jobagg-http";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Auth,
    RateLimited,
    Server,
    Client,
}

pub fn classify_status(status: StatusCode) -> StatusClass {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        StatusClass::Auth
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        StatusClass::RateLimited
    } else if status.is_server_error() {
        StatusClass::Server
    } else {
        StatusClass::Client
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub global_concurrency: usize,
    pub per_source_concurrency: usize,
    pub token_bucket: Option<TokenBucketConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: None,
            global_concurrency: 8,
            per_source_concurrency: 1,
            token_bucket: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBucketConfig {
    pub capacity: u32,
    pub refill_every: Duration,
}

/// Hands out one token per request; a token is restored every `refill_every`
/// up to `capacity`.
#[derive(Debug)]
pub struct TokenBucket {
    config: TokenBucketConfig,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    refilled_at: Instant,
}

impl BucketState {
    fn refill(&mut self, config: TokenBucketConfig) {
        if config.refill_every.is_zero() {
            self.tokens = config.capacity;
            return;
        }
        let elapsed = self.refilled_at.elapsed();
        let periods = (elapsed.as_nanos() / config.refill_every.as_nanos()).min(u128::from(config.capacity)) as u32;
        if periods == 0 {
            return;
        }
        self.tokens = self.tokens.saturating_add(periods).min(config.capacity);
        self.refilled_at = if periods == config.capacity {
            Instant::now()
        } else {
            self.refilled_at + config.refill_every * periods
        };
    }
}

impl TokenBucket {
    pub fn new(config: TokenBucketConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BucketState {
                tokens: config.capacity,
                refilled_at: Instant::now(),
            }),
        }
    }

    /// Waits until a token is available and takes it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                state.refill(self.config);
                if state.tokens > 0 {
                    state.tokens -= 1;
                    return;
                }
                self.config.refill_every.saturating_sub(state.refilled_at.elapsed())
            };
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }
}

#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    global: Arc<Semaphore>,
    per_source_limit: usize,
    per_source: Mutex<HashMap<String, Arc<Semaphore>>>,
    bucket: Option<TokenBucket>,
}

/// Permits held for the duration of one request.
#[derive(Debug)]
pub struct Admission {
    _global: OwnedSemaphorePermit,
    _source: OwnedSemaphorePermit,
}

#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: StatusCode,
    pub final_url: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure; the URL is stripped because keys travel in it.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("provider rejected credentials (http {status})")]
    Unauthorized { status: u16 },
    #[error("provider rate limited the request (http 429)")]
    RateLimited,
    #[error("http status {status} from {host}")]
    HttpStatus { status: u16, host: String },
    #[error("http client shut down")]
    Closed,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.without_url())
    }
}

impl HttpFetcher {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let builder = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(config.timeout);
        let builder = match &config.user_agent {
            Some(agent) => builder.user_agent(agent.as_str()),
            None => builder,
        };

        Ok(Self {
            client: builder.build().context("building reqwest client")?,
            global: Arc::new(Semaphore::new(config.global_concurrency.max(1))),
            per_source_limit: config.per_source_concurrency.max(1),
            per_source: Mutex::new(HashMap::new()),
            bucket: config.token_bucket.map(TokenBucket::new),
        })
    }

    /// Takes a global slot, a slot for `source_id` and, when configured, a
    /// rate-limit token.
    pub async fn admit(&self, source_id: &str) -> Result<Admission, FetchError> {
        let global = self.global.clone().acquire_owned().await.map_err(|_| FetchError::Closed)?;
        let source_slots = {
            let mut slots = self.per_source.lock().await;
            slots
                .entry(source_id.to_string())
                .or_insert_with(|| Arc::new(Semaphore::new(self.per_source_limit)))
                .clone()
        };
        let source = source_slots.acquire_owned().await.map_err(|_| FetchError::Closed)?;
        if let Some(bucket) = &self.bucket {
            bucket.acquire().await;
        }
        Ok(Admission {
            _global: global,
            _source: source,
        })
    }

    pub async fn get_bytes(
        &self,
        run_id: Uuid,
        source_id: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<FetchedResponse, FetchError> {
        let request = self.client.get(url).query(query);
        self.execute(run_id, source_id, url, request).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        run_id: Uuid,
        source_id: &str,
        url: &str,
        body: &B,
    ) -> Result<FetchedResponse, FetchError> {
        let request = self.client.post(url).json(body);
        self.execute(run_id, source_id, url, request).await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        source_id: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<FetchedResponse, FetchError> {
        let _admission = self.admit(source_id).await?;

        // Credentials can travel in the path or query, so only the host is logged.
        let host = loggable_host(url);
        let span = info_span!("http_fetch", %run_id, source_id, host = %host);

        send(request, host).instrument(span).await
    }
}

async fn send(request: RequestBuilder, host: String) -> Result<FetchedResponse, FetchError> {
    let resp = request.send().await?;
    let status = resp.status();
    let final_url = resp.url().to_string();
    debug!(status = status.as_u16(), "provider responded");

    if status.is_success() {
        let body = resp.bytes().await?.to_vec();
        return Ok(FetchedResponse {
            status,
            final_url,
            body,
        });
    }

    Err(match classify_status(status) {
        StatusClass::Auth => FetchError::Unauthorized {
            status: status.as_u16(),
        },
        StatusClass::RateLimited => FetchError::RateLimited,
        StatusClass::Server | StatusClass::Client => FetchError::HttpStatus {
            status: status.as_u16(),
            host,
        },
    })
}

pub fn loggable_host(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
        .unwrap_or_else(|| "<invalid-url>".to_string())
}
