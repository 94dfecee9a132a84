use crate::infra::{refresh_blocking, AppState};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use lifecycle_risk::aggregate::{
    self, CorrelationMatrix, DistrictQuery, FlagSummary, QueryError, RankLimit,
    RiskDistribution, StateFilter, StateStats, SummaryStats, TopDistricts,
};
use lifecycle_risk::error::AppError;
use lifecycle_risk::scoring::{DistrictView, RiskCategory, ScoredTable};
use lifecycle_risk::snapshot::SnapshotStatus;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// `false` while no refresh has succeeded and answers come from an empty table.
pub(crate) const SNAPSHOT_READY: &str = "x-snapshot-ready";
/// Epoch of the table behind the answer; 0 for the empty table.
pub(crate) const SNAPSHOT_EPOCH: &str = "x-snapshot-epoch";

type SnapshotHeaders = [(&'static str, String); 2];

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StateParams {
    #[serde(default)]
    pub(crate) state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DistrictParams {
    #[serde(default)]
    pub(crate) state: Option<String>,
    #[serde(default)]
    pub(crate) risk_category: Option<String>,
    #[serde(default)]
    pub(crate) min_alhs: Option<f64>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TopParams {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    #[serde(default)]
    pub(crate) state: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DistrictList {
    pub(crate) count: usize,
    pub(crate) districts: Vec<DistrictView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StateNames {
    pub(crate) states: Vec<String>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/status", get(status_endpoint))
        .route("/api/v1/summary", get(summary_endpoint))
        .route("/api/v1/districts", get(districts_endpoint))
        .route("/api/v1/districts/:district_id", get(district_endpoint))
        .route("/api/v1/states", get(states_endpoint))
        .route("/api/v1/states/names", get(state_names_endpoint))
        .route("/api/v1/top-risk-districts", get(top_districts_endpoint))
        .route("/api/v1/flags/summary", get(flags_endpoint))
        .route("/api/v1/risk-distribution", get(distribution_endpoint))
        .route("/api/v1/correlation-matrix", get(correlation_endpoint))
        .route("/api/v1/refresh", post(refresh_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.store.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn status_endpoint(Extension(state): Extension<AppState>) -> Json<SnapshotStatus> {
    Json(state.store.status())
}

pub(crate) async fn summary_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<StateParams>,
) -> (SnapshotHeaders, Json<SummaryStats>) {
    let (table, headers) = read_snapshot(&state);
    let summary = aggregate::summary(&table, &StateFilter::from_param(params.state));
    (headers, Json(summary))
}

pub(crate) async fn districts_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<DistrictParams>,
) -> Result<(SnapshotHeaders, Json<DistrictList>), AppError> {
    let (table, headers) = read_snapshot(&state);
    let risk_category = params
        .risk_category
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_category(&table, raw))
        .transpose()?;

    let query = DistrictQuery {
        state: StateFilter::from_param(params.state),
        risk_category,
        min_alhs: params.min_alhs,
        limit: params.limit,
    };
    let districts = aggregate::list_districts(&table, &query);

    Ok((
        headers,
        Json(DistrictList {
            count: districts.len(),
            districts,
        }),
    ))
}

pub(crate) async fn district_endpoint(
    Extension(state): Extension<AppState>,
    Path(district_id): Path<String>,
) -> Result<Json<DistrictView>, AppError> {
    state
        .store
        .lookup(&district_id)
        .map(|record| Json(record.to_view()))
        .ok_or(AppError::NotFound(district_id))
}

pub(crate) async fn states_endpoint(
    Extension(state): Extension<AppState>,
) -> (SnapshotHeaders, Json<Vec<StateStats>>) {
    let (table, headers) = read_snapshot(&state);
    (headers, Json(aggregate::state_rollup(&table)))
}

pub(crate) async fn state_names_endpoint(
    Extension(state): Extension<AppState>,
) -> (SnapshotHeaders, Json<StateNames>) {
    let (table, headers) = read_snapshot(&state);
    let states = aggregate::state_names(&table);
    (headers, Json(StateNames { states }))
}

pub(crate) async fn top_districts_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<TopParams>,
) -> Result<(SnapshotHeaders, Json<TopDistricts>), AppError> {
    let limit = match params.limit {
        Some(limit) => RankLimit::new(limit)?,
        None => RankLimit::default(),
    };
    let (table, headers) = read_snapshot(&state);
    let top = aggregate::top_districts(&table, limit, &StateFilter::from_param(params.state));
    Ok((headers, Json(top)))
}

pub(crate) async fn flags_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<StateParams>,
) -> (SnapshotHeaders, Json<FlagSummary>) {
    let (table, headers) = read_snapshot(&state);
    let flags = aggregate::flag_summary(&table, &StateFilter::from_param(params.state));
    (headers, Json(flags))
}

pub(crate) async fn distribution_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<StateParams>,
) -> (SnapshotHeaders, Json<RiskDistribution>) {
    let (table, headers) = read_snapshot(&state);
    let filter = StateFilter::from_param(params.state);
    (headers, Json(aggregate::risk_distribution(&table, &filter)))
}

pub(crate) async fn correlation_endpoint(
    Extension(state): Extension<AppState>,
) -> (SnapshotHeaders, Json<CorrelationMatrix>) {
    let (table, headers) = read_snapshot(&state);
    (headers, Json(aggregate::correlation_matrix(&table)))
}

pub(crate) async fn refresh_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<SnapshotStatus>, AppError> {
    refresh_blocking(state.store.clone()).await?;
    Ok(Json(state.store.status()))
}

/// The table to answer from, tagged with whether it came from a refresh.
fn read_snapshot(state: &AppState) -> (Arc<ScoredTable>, SnapshotHeaders) {
    let (table, ready) = match state.store.current() {
        Some(table) => (table, true),
        None => (Arc::new(state.store.engine().empty_table()), false),
    };
    let headers = [
        (SNAPSHOT_READY, ready.to_string()),
        (SNAPSHOT_EPOCH, table.epoch().to_string()),
    ];
    (table, headers)
}

/// Only categories of the active cut-point set are accepted.
fn parse_category(table: &ScoredTable, raw: &str) -> Result<RiskCategory, QueryError> {
    RiskCategory::parse(raw)
        .filter(|category| table.cut_points().contains(*category))
        .ok_or_else(|| QueryError::UnknownRiskCategory(raw.trim().to_string()))
}
