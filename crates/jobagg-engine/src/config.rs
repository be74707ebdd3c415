//! Runtime configuration and the source registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use jobagg_adapters::{
    adapter_for_source, replay_adapter_for_source, AdapterDeps, AdapterError, ProviderCredentials, KNOWN_SOURCES,
};
use jobagg_http::{HttpClientConfig, HttpFetcher, TokenBucketConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregator::RegisteredSource;

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub source_timeout: Duration,
    pub global_deadline: Duration,
    pub courtesy_delay: Duration,
    /// Added to a source's expected yield when sizing its request.
    pub yield_margin: usize,
    pub max_target: usize,
    pub backfill_enabled: bool,
    pub backfill_seed: Option<u64>,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub token_bucket: Option<TokenBucketConfig>,
    pub registry_path: PathBuf,
    /// When set, HTTP sources answer from recorded responses under this directory.
    pub fixtures_dir: Option<PathBuf>,
    pub credentials: ProviderCredentials,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(10),
            global_deadline: Duration::from_secs(45),
            courtesy_delay: Duration::from_millis(500),
            yield_margin: 5,
            max_target: 100,
            backfill_enabled: true,
            backfill_seed: None,
            user_agent: "jobagg/0.1".to_string(),
            http_timeout: Duration::from_secs(15),
            token_bucket: None,
            registry_path: PathBuf::from("sources.yaml"),
            fixtures_dir: None,
            credentials: ProviderCredentials::default(),
        }
    }
}

impl AggregatorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());
        let secs = |key: &str, default: Duration| parsed(key).map(Duration::from_secs).unwrap_or(default);
        let millis = |key: &str, default: Duration| parsed(key).map(Duration::from_millis).unwrap_or(default);
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token_bucket = match (parsed("JOBAGG_TOKEN_BUCKET_CAPACITY"), parsed("JOBAGG_TOKEN_REFILL_MS")) {
            (Some(capacity), Some(refill_ms)) if capacity > 0 => Some(TokenBucketConfig {
                capacity: u32::try_from(capacity).unwrap_or(u32::MAX),
                refill_every: Duration::from_millis(refill_ms),
            }),
            _ => None,
        };

        Self {
            source_timeout: secs("JOBAGG_SOURCE_TIMEOUT_SECS", defaults.source_timeout),
            global_deadline: secs("JOBAGG_DEADLINE_SECS", defaults.global_deadline),
            courtesy_delay: millis("JOBAGG_COURTESY_DELAY_MS", defaults.courtesy_delay),
            yield_margin: parsed("JOBAGG_YIELD_MARGIN")
                .map(|v| v as usize)
                .unwrap_or(defaults.yield_margin),
            max_target: parsed("JOBAGG_MAX_TARGET")
                .map(|v| v as usize)
                .filter(|v| *v > 0)
                .unwrap_or(defaults.max_target),
            backfill_enabled: get("JOBAGG_BACKFILL_ENABLED")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
                .unwrap_or(defaults.backfill_enabled),
            backfill_seed: parsed("JOBAGG_BACKFILL_SEED"),
            user_agent: non_empty("JOBAGG_USER_AGENT").unwrap_or(defaults.user_agent),
            http_timeout: secs("JOBAGG_HTTP_TIMEOUT_SECS", defaults.http_timeout),
            token_bucket,
            registry_path: non_empty("JOBAGG_REGISTRY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.registry_path),
            fixtures_dir: non_empty("JOBAGG_FIXTURES_DIR").map(PathBuf::from),
            credentials: ProviderCredentials {
                adzuna_app_id: non_empty("ADZUNA_APP_ID"),
                adzuna_app_key: non_empty("ADZUNA_APP_KEY"),
                adzuna_country: non_empty("ADZUNA_COUNTRY"),
                jooble_api_key: non_empty("JOOBLE_API_KEY"),
            },
        }
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: self.http_timeout,
            user_agent: Some(self.user_agent.clone()),
            token_bucket: self.token_bucket,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRegistry {
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub source_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower runs first; defaults to the adapter's own priority.
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub expected_yield: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl SourceRegistry {
    /// Every known adapter, enabled, with its built-in priority and yield.
    pub fn builtin() -> Self {
        Self {
            sources: KNOWN_SOURCES
                .iter()
                .map(|d| SourceConfig {
                    source_id: d.source_id.to_string(),
                    enabled: true,
                    priority: Some(d.default_priority),
                    expected_yield: Some(d.expected_yield),
                    timeout_secs: None,
                    notes: None,
                })
                .collect(),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing source registry")
    }

    /// A missing file means "use the built-in registry"; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_yaml_str(&text).with_context(|| format!("loading {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "source registry not found; using built-in sources");
                Ok(Self::builtin())
            }
            Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
        }
    }
}

/// Instantiates adapters for every enabled registry entry. Keyed sources
/// without credentials are skipped with a warning.
pub fn build_sources(config: &AggregatorConfig, registry: &SourceRegistry) -> Result<Vec<RegisteredSource>> {
    let http = Arc::new(HttpFetcher::new(config.http_client_config())?);
    let deps = AdapterDeps {
        http,
        credentials: config.credentials.clone(),
        style_seed: config.backfill_seed,
    };

    let mut sources = Vec::new();
    for entry in registry.sources.iter().filter(|s| s.enabled) {
        let built = match &config.fixtures_dir {
            Some(dir) => replay_adapter_for_source(&entry.source_id, dir, &deps),
            None => adapter_for_source(&entry.source_id, &deps),
        };
        let adapter = match built {
            Ok(adapter) => adapter,
            Err(AdapterError::MissingCredentials { source_id, missing }) => {
                warn!(%source_id, missing, "source disabled: missing credentials");
                continue;
            }
            Err(err) => return Err(err).with_context(|| format!("building adapter for {}", entry.source_id)),
        };
        let mut source = RegisteredSource::new(Arc::from(adapter));
        if let Some(priority) = entry.priority {
            source.priority = priority;
        }
        if let Some(expected_yield) = entry.expected_yield {
            source.expected_yield = expected_yield;
        }
        source.timeout = entry.timeout_secs.map(Duration::from_secs);
        sources.push(source);
    }
    Ok(sources)
}
