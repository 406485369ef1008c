// Copyright 2026 Roster Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for Roster Scout.
//!
//! Every JSON response carries `_meta.app_version`. Invalid input maps to
//! 400, an empty match list to 404.

use crate::acquisition::{HttpClient, PageSource};
use crate::config::ScoutConfig;
use crate::discovery::{AssociationFilter, Discoverer, DiscoveryRequest};
use crate::error::ScoutError;
use crate::extraction::RosterExtractor;
use crate::matching::{run_matches, MatchRequest};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Everything the handlers share.
pub struct AppState {
    pub config: ScoutConfig,
    pub discoverer: Discoverer<dyn PageSource>,
    pub extractor: RosterExtractor<dyn PageSource>,
}

impl AppState {
    /// Production state: one HTTP client per component, each with its own
    /// timeout.
    pub fn from_config(config: ScoutConfig) -> Self {
        let discovery_client: Arc<dyn PageSource> =
            Arc::new(HttpClient::new(&config, config.discovery_timeout()));
        let roster_client: Arc<dyn PageSource> =
            Arc::new(HttpClient::new(&config, config.roster_timeout()));
        Self::with_sources(config, discovery_client, roster_client)
    }

    pub fn with_sources(
        config: ScoutConfig,
        discovery: Arc<dyn PageSource>,
        roster: Arc<dyn PageSource>,
    ) -> Self {
        Self {
            discoverer: Discoverer::new(discovery, &config),
            extractor: RosterExtractor::new(roster, config.roster_ttl()),
            config,
        }
    }

    fn version(&self) -> &str {
        &self.config.app_version
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/clear", get(cache_clear).post(cache_clear))
        .route("/discover", get(discover))
        .route("/rebuild", get(rebuild))
        .route("/roster", get(roster))
        .route("/matches", post(matches))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `addr` until ctrl-c.
pub async fn start(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────

/// A failed request: status plus a `detail` message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
    version: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>, version: &str) -> Self {
        Self {
            status,
            detail: detail.into(),
            version: version.to_string(),
        }
    }

    fn from_scout(err: ScoutError, version: &str) -> Self {
        let status = match &err {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            ScoutError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string(), version)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "detail": self.detail,
            "_meta": { "app_version": self.version },
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

/// Serialize `value` and stamp it with `_meta.app_version`.
fn with_meta<T: Serialize>(value: &T, version: &str) -> ApiResult {
    let mut body =
        serde_json::to_value(value).map_err(|e| ApiError::from_scout(e.into(), version))?;
    if let Value::Object(map) = &mut body {
        map.insert("_meta".into(), json!({ "app_version": version }));
    }
    Ok(Json(body))
}

// ── Handlers ────────────────────────────────────────────────────

async fn root(State(state): State<Arc<AppState>>) -> ApiResult {
    with_meta(&json!({ "ok": true }), state.version())
}

async fn health(State(state): State<Arc<AppState>>) -> ApiResult {
    with_meta(
        &json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "discovery_version": state.version(),
        }),
        state.version(),
    )
}

async fn cache_stats(State(state): State<Arc<AppState>>) -> ApiResult {
    with_meta(
        &json!({
            "discovery": state.discoverer.cache_stats(),
            "roster": state.extractor.cache_stats(),
        }),
        state.version(),
    )
}

async fn cache_clear(State(state): State<Arc<AppState>>) -> ApiResult {
    state.discoverer.clear_cache();
    state.extractor.clear_cache();
    with_meta(&json!({ "ok": true }), state.version())
}

/// Query string of `/discover` and `/rebuild`.
#[derive(Debug, Deserialize)]
struct DiscoverParams {
    sport: String,
    region: Option<String>,
    /// Single state code.
    state: Option<String>,
    /// Comma-separated state codes; wins over `state`.
    states: Option<String>,
    sources: Option<String>,
    #[serde(default)]
    include_diii: bool,
    #[serde(default)]
    include_njcaa: bool,
    cache_hours: Option<f64>,
    #[serde(default)]
    diag: bool,
}

impl DiscoverParams {
    fn into_request(self) -> DiscoveryRequest {
        let states = match (self.states, self.state) {
            (Some(csv), _) => Some(csv.split(',').map(|s| s.trim().to_string()).collect()),
            (None, Some(one)) => Some(vec![one]),
            (None, None) => None,
        };
        DiscoveryRequest {
            sport: Some(self.sport),
            region: self.region,
            states,
            sources: self.sources,
            filter: AssociationFilter::new(self.include_diii, self.include_njcaa),
            cache_hours: self.cache_hours,
            diagnostics: self.diag,
        }
    }
}

async fn discover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverParams>,
) -> ApiResult {
    let req = params.into_request();
    match state.discoverer.discover(&req).await {
        Ok(result) => with_meta(&result, state.version()),
        Err(e) => Err(ApiError::from_scout(e, state.version())),
    }
}

async fn rebuild(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverParams>,
) -> ApiResult {
    let req = params.into_request();
    match state.discoverer.rebuild(&req).await {
        Ok(result) => with_meta(&result, state.version()),
        Err(e) => Err(ApiError::from_scout(e, state.version())),
    }
}

#[derive(Debug, Deserialize)]
struct RosterParams {
    url: String,
}

async fn roster(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RosterParams>,
) -> ApiResult {
    match state.extractor.extract_roster(&params.url).await {
        Ok(extraction) => with_meta(&extraction, state.version()),
        Err(e) => Err(ApiError::from_scout(e, state.version())),
    }
}

/// Filter flags and TTL override for `/matches`, passed in the query string.
#[derive(Debug, Default, Deserialize)]
struct MatchFlags {
    #[serde(default)]
    include_diii: bool,
    #[serde(default)]
    include_njcaa: bool,
    cache_hours: Option<f64>,
}

async fn matches(
    State(state): State<Arc<AppState>>,
    Query(flags): Query<MatchFlags>,
    Json(req): Json<MatchRequest>,
) -> ApiResult {
    let filter = AssociationFilter::new(flags.include_diii, flags.include_njcaa);
    let report = run_matches(
        &state.discoverer,
        &state.extractor,
        &req,
        filter,
        flags.cache_hours,
    )
    .await
    .map_err(|e| ApiError::from_scout(e, state.version()))?;

    if report.discovery.count == 0 {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "Could not discover roster URLs for that sport/region.",
            state.version(),
        ));
    }
    if report.results.is_empty() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "No valid roster pages parsed for that sport/region.",
            state.version(),
        ));
    }
    with_meta(&report, state.version())
}
