//! Thin axum JSON front for the aggregation engine.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use jobagg_engine::{AggregateError, AggregateRequest, Aggregator, AggregatorConfig};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const CRATE_NAME: &str = "jobagg-web";
pub const DEFAULT_LIMIT: usize = 25;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    /// Cancelled on shutdown; in-flight searches finish with what they have.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            shutdown: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// Kept as text so a bad value yields a JSON 400 rather than a plain rejection.
    pub limit: Option<String>,
    pub location: Option<String>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/jobs/search", get(search_handler))
        .route("/api/sources", get(sources_handler))
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let shutdown = state.shutdown.clone();
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
            }
            shutdown.cancel();
        })
        .await?;
    Ok(())
}

pub async fn serve_from_env() -> anyhow::Result<()> {
    let port: u16 = std::env::var("JOBAGG_WEB_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    let aggregator = Aggregator::from_config(AggregatorConfig::from_env())?;
    serve(AppState::new(aggregator), port).await
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn search_handler(State(state): State<Arc<AppState>>, Query(params): Query<SearchParams>) -> Response {
    let max = state.aggregator.config().max_target;
    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_LIMIT.min(max),
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) => limit,
            Err(_) => return bad_request(format!("limit must be an integer between 1 and {max}, got `{raw}`")),
        },
    };

    let request = AggregateRequest::from_phrase(&params.q, params.location.as_deref(), limit);
    let cancel = state.shutdown.child_token();
    match state.aggregator.aggregate(&request, &cancel).await {
        Ok(result) => Json(result).into_response(),
        Err(err @ AggregateError::InvalidTarget { .. }) => bad_request(err.to_string()),
    }
}

async fn sources_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(json!({"sources": state.aggregator.sources()})).into_response()
}

fn bad_request(message: String) -> Response {
    warn!(%message, "rejected search request");
    (StatusCode::BAD_REQUEST, Json(json!({"success": false, "error": message}))).into_response()
}
