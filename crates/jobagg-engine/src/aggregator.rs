//! Drives source adapters in priority order and assembles the result envelope.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jobagg_adapters::{AdapterContext, FetchQuery, SourceAdapter, SourceKind};
use jobagg_core::{AggregationResult, Job, SourceOutcome, SourceReport};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::backfill::BackfillGenerator;
use crate::config::{build_sources, AggregatorConfig, SourceRegistry};
use crate::dedup::{near_duplicates, Deduplicator, NEAR_DUPLICATE_THRESHOLD};
use crate::normalize::{normalize, NormalizeContext};
use crate::query::interpret;
use crate::score::{rank, rerank, score_job, RankWeights};
use crate::AggregateError;

/// Upper bound on the run deadline; larger configured values are clamped.
const MAX_GLOBAL_DEADLINE: Duration = Duration::from_secs(24 * 60 * 60);

/// One adapter plus the scheduling facts the registry assigned to it.
#[derive(Clone)]
pub struct RegisteredSource {
    pub adapter: Arc<dyn SourceAdapter>,
    pub priority: u32,
    pub expected_yield: usize,
    /// Overrides the configured per-source timeout.
    pub timeout: Option<Duration>,
}

impl RegisteredSource {
    pub fn new(adapter: Arc<dyn SourceAdapter>) -> Self {
        let descriptor = adapter.descriptor();
        Self {
            adapter,
            priority: descriptor.default_priority,
            expected_yield: descriptor.expected_yield,
            timeout: None,
        }
    }
}

/// What `/api/sources` and `jobagg sources` show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub source_id: String,
    pub kind: SourceKind,
    pub priority: u32,
    pub expected_yield: usize,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRequest {
    pub keywords: String,
    pub location: String,
    pub target: usize,
    /// Re-rank real jobs by weighted sub-scores instead of the default order.
    pub weights: Option<RankWeights>,
}

impl AggregateRequest {
    pub fn new(keywords: impl Into<String>, location: impl Into<String>, target: usize) -> Self {
        Self {
            keywords: keywords.into(),
            location: location.into(),
            target,
            weights: None,
        }
    }

    /// Interprets a free-text phrase; an explicit location wins over one
    /// found in the phrase.
    pub fn from_phrase(phrase: &str, location: Option<&str>, target: usize) -> Self {
        let query = interpret(phrase);
        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .unwrap_or(query.location);
        Self::new(query.keywords, location, target)
    }

    pub fn with_weights(mut self, weights: RankWeights) -> Self {
        self.weights = Some(weights);
        self
    }
}

enum Attempt {
    Listings(Vec<jobagg_core::RawListing>),
    Failed(String),
    Cancelled,
}

pub struct Aggregator {
    config: AggregatorConfig,
    sources: Vec<RegisteredSource>,
    backfill: BackfillGenerator,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig, mut sources: Vec<RegisteredSource>) -> Self {
        sources.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.adapter.source_id().cmp(b.adapter.source_id()))
        });
        let backfill = BackfillGenerator::new(config.backfill_seed);
        Self {
            config,
            sources,
            backfill,
        }
    }

    /// Loads the registry named by the config and builds its adapters.
    pub fn from_config(config: AggregatorConfig) -> anyhow::Result<Self> {
        let registry = SourceRegistry::load(&config.registry_path)?;
        let sources = build_sources(&config, &registry)?;
        Ok(Self::new(config, sources))
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Registered sources in call order.
    pub fn sources(&self) -> Vec<SourceInfo> {
        self.sources
            .iter()
            .map(|s| {
                let descriptor = s.adapter.descriptor();
                SourceInfo {
                    source_id: descriptor.source_id.to_string(),
                    kind: descriptor.kind,
                    priority: s.priority,
                    expected_yield: s.expected_yield,
                    timeout_ms: s.timeout.unwrap_or(self.config.source_timeout).as_millis() as u64,
                }
            })
            .collect()
    }

    pub async fn aggregate(
        &self,
        request: &AggregateRequest,
        cancel: &CancellationToken,
    ) -> Result<AggregationResult, AggregateError> {
        if request.target == 0 || request.target > self.config.max_target {
            return Err(AggregateError::InvalidTarget {
                requested: request.target,
                max: self.config.max_target,
            });
        }
        let run_id = Uuid::new_v4();
        let span = info_span!("aggregate", %run_id, keywords = %request.keywords, target = request.target);
        Ok(self.run(run_id, request, cancel).instrument(span).await)
    }

    async fn run(&self, run_id: Uuid, request: &AggregateRequest, cancel: &CancellationToken) -> AggregationResult {
        let started = Instant::now();
        let deadline = started + self.config.global_deadline.min(MAX_GLOBAL_DEADLINE);
        let now = Utc::now();
        let target = request.target;
        info!(location = %request.location, sources = self.sources.len(), "aggregation started");

        let ctx = AdapterContext { run_id, requested_at: now };
        let norm_ctx = NormalizeContext {
            requested_location: &request.location,
            now,
        };

        let mut dedup = Deduplicator::new();
        let mut real: Vec<Job> = Vec::new();
        let mut reports: Vec<SourceReport> = Vec::new();
        let mut successful_sources = 0usize;
        let mut cancelled = false;

        for source in &self.sources {
            let remaining = target.saturating_sub(real.len());
            if remaining == 0 {
                debug!("target reached; skipping remaining sources");
                break;
            }
            if !reports.is_empty() && !self.config.courtesy_delay.is_zero() {
                let pause = self.config.courtesy_delay.min(deadline.saturating_duration_since(Instant::now()));
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(pause) => {}
                }
            }
            if cancel.is_cancelled() || Instant::now() >= deadline {
                warn!("run cancelled or past deadline; stopping source iteration");
                cancelled = true;
                break;
            }

            let source_id = source.adapter.source_id();
            let limit = remaining.min(source.expected_yield.saturating_add(self.config.yield_margin));
            let budget = source
                .timeout
                .unwrap_or(self.config.source_timeout)
                .min(deadline.saturating_duration_since(Instant::now()));
            let query = FetchQuery {
                keywords: request.keywords.clone(),
                location: request.location.clone(),
                limit,
            };
            debug!(source_id, limit, budget_ms = budget.as_millis() as u64, "calling source");

            let call_started = Instant::now();
            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => Attempt::Cancelled,
                result = tokio::time::timeout(budget, source.adapter.fetch(&ctx, &query)) => match result {
                    Ok(Ok(listings)) => Attempt::Listings(listings),
                    Ok(Err(err)) => Attempt::Failed(err.to_string()),
                    Err(_) => Attempt::Failed(format!("timed out after {}ms", budget.as_millis())),
                },
            };
            let elapsed_ms = call_started.elapsed().as_millis() as u64;

            let mut report = SourceReport {
                source_id: source_id.to_string(),
                priority: source.priority,
                outcome: SourceOutcome::Failed,
                returned: 0,
                accepted: 0,
                elapsed_ms,
                error: None,
            };
            match attempt {
                Attempt::Cancelled => {
                    report.error = Some("cancelled".to_string());
                    reports.push(report);
                    warn!(source_id, "run cancelled during source call");
                    cancelled = true;
                    break;
                }
                Attempt::Failed(error) => {
                    warn!(source_id, elapsed_ms, %error, "source failed");
                    report.error = Some(error);
                }
                Attempt::Listings(listings) if listings.is_empty() => {
                    info!(source_id, elapsed_ms, "source returned no listings");
                    report.outcome = SourceOutcome::Empty;
                }
                Attempt::Listings(mut listings) => {
                    listings.truncate(limit);
                    report.returned = listings.len();
                    for raw in &listings {
                        let job = normalize(raw, &norm_ctx);
                        if dedup.insert(&job) {
                            real.push(job);
                            report.accepted += 1;
                        }
                    }
                    report.outcome = SourceOutcome::Success;
                    successful_sources += 1;
                    info!(
                        source_id,
                        elapsed_ms,
                        returned = report.returned,
                        accepted = report.accepted,
                        "source succeeded"
                    );
                }
            }
            reports.push(report);
        }

        for job in &mut real {
            score_job(job, &request.keywords);
        }
        match &request.weights {
            Some(weights) => rerank(&mut real, weights),
            None => rank(&mut real),
        }
        let review_candidates = near_duplicates(&real, NEAR_DUPLICATE_THRESHOLD);

        let shortfall = target.saturating_sub(real.len());
        let mut synthetic = Vec::new();
        if shortfall > 0 && self.config.backfill_enabled {
            synthetic = self
                .backfill
                .generate(&request.keywords, &request.location, shortfall, &mut dedup, now);
            for job in &mut synthetic {
                score_job(job, &request.keywords);
            }
            rank(&mut synthetic);
            info!(shortfall, generated = synthetic.len(), "backfilled shortfall");
        }

        let mut jobs = real;
        jobs.extend(synthetic);
        jobs.truncate(target);

        let mut source_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        for job in &jobs {
            *source_breakdown.entry(job.source.clone()).or_default() += 1;
        }
        let synthetic_count = jobs.iter().filter(|j| j.is_synthetic()).count();
        let processing_time_ms = started.elapsed().as_millis() as u64;

        info!(
            total = jobs.len(),
            synthetic = synthetic_count,
            successful_sources,
            cancelled,
            processing_time_ms,
            "aggregation finished"
        );

        AggregationResult {
            success: !jobs.is_empty(),
            run_id,
            keywords: request.keywords.clone(),
            location: request.location.clone(),
            total_found: jobs.len(),
            successful_sources,
            processing_time_ms,
            source_breakdown,
            real_count: jobs.len() - synthetic_count,
            synthetic_count,
            cancelled,
            sources: reports,
            review_candidates,
            jobs,
        }
    }
}
