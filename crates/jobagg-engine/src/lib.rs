//! Aggregation pipeline: query interpretation, normalization, deduplication,
//! scoring, backfill and the orchestrator that drives the source adapters.

pub mod aggregator;
pub mod backfill;
pub mod config;
pub mod dedup;
pub mod infer;
pub mod normalize;
pub mod query;
pub mod score;

use thiserror::Error;

pub use aggregator::{AggregateRequest, Aggregator, RegisteredSource, SourceInfo};
pub use config::{AggregatorConfig, SourceConfig, SourceRegistry};
pub use query::{interpret, SearchQuery};
pub use score::RankWeights;

pub const CRATE_NAME: &str = "jobagg-engine";

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("target must be between 1 and {max}, got {requested}")]
    InvalidTarget { requested: usize, max: usize },
}
