//! Dashboard HTTP routes
//!
//! Store calls are blocking, so every handler moves its work onto the
//! blocking pool.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::errors::{ApiError, ApiResult};
use super::login::{LoginOutcome, LoginProbe};
use super::marker::{select_marker, MapMarker};
use super::table::TableView;
use crate::store::{DocumentBackend, Record, RecordStore, StoreResult};

// ==================
// Shared State
// ==================

/// State shared by all dashboard handlers
pub struct DashboardState<B: DocumentBackend> {
    pub store: Arc<RecordStore<B>>,
    pub login: LoginProbe,
}

impl<B: DocumentBackend> DashboardState<B> {
    pub fn new(store: RecordStore<B>, login: LoginProbe) -> Self {
        Self {
            store: Arc::new(store),
            login,
        }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub collection: String,
    pub ping: Record,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default = "empty_mapping")]
    pub query: Value,
    #[serde(default)]
    pub projection: Option<Value>,
    #[serde(default)]
    pub limit: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub records: Vec<Record>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default = "empty_mapping")]
    pub query: Value,
    #[serde(default = "empty_mapping")]
    pub fields: Value,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default = "empty_mapping")]
    pub query: Value,
}

#[derive(Debug, Deserialize)]
pub struct MapParams {
    pub row: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn empty_mapping() -> Value {
    Value::Object(Map::new())
}

// ==================
// Router
// ==================

/// Build the dashboard router over `state`
pub fn dashboard_routes<B: DocumentBackend + 'static>(state: Arc<DashboardState<B>>) -> Router {
    Router::new()
        .route("/health", get(health::<B>))
        .route(
            "/api/records",
            get(list_records::<B>)
                .post(create_record::<B>)
                .patch(update_records::<B>)
                .delete(delete_records::<B>),
        )
        .route("/api/records/query", post(query_records::<B>))
        .route("/api/map", get(map_marker::<B>))
        .route("/api/login", post(login::<B>))
        .with_state(state)
}

async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

// ==================
// Handlers
// ==================

async fn health<B: DocumentBackend + 'static>(
    State(state): State<Arc<DashboardState<B>>>,
) -> impl IntoResponse {
    let store = state.store.clone();
    let ping = tokio::task::spawn_blocking(move || store.ping())
        .await
        .unwrap_or_default();

    let (status, label) = if ping.is_empty() {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    } else {
        (StatusCode::OK, "ok")
    };

    let body = HealthResponse {
        status: label.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: state.store.database().to_string(),
        collection: state.store.collection().to_string(),
        ping,
    };
    (status, Json(body))
}

async fn list_records<B: DocumentBackend + 'static>(
    State(state): State<Arc<DashboardState<B>>>,
) -> ApiResult<Json<TableView>> {
    let store = state.store.clone();
    let records = blocking(move || store.read(&empty_mapping(), None, 0)).await?;
    Ok(Json(TableView::from_records(records)))
}

async fn query_records<B: DocumentBackend + 'static>(
    State(state): State<Arc<DashboardState<B>>>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let store = state.store.clone();
    let records = blocking(move || {
        store.read(&request.query, request.projection.as_ref(), request.limit)
    })
    .await?;
    Ok(Json(QueryResponse {
        count: records.len(),
        records,
    }))
}

async fn create_record<B: DocumentBackend + 'static>(
    State(state): State<Arc<DashboardState<B>>>,
    Json(record): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let store = state.store.clone();
    let created = blocking(move || store.create(record)).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!({ "created": created }))))
}

async fn update_records<B: DocumentBackend + 'static>(
    State(state): State<Arc<DashboardState<B>>>,
    Json(request): Json<UpdateRequest>,
) -> ApiResult<Json<Value>> {
    let store = state.store.clone();
    let modified = blocking(move || store.update(&request.query, &request.fields)).await?;
    Ok(Json(json!({ "modified": modified })))
}

async fn delete_records<B: DocumentBackend + 'static>(
    State(state): State<Arc<DashboardState<B>>>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<Json<Value>> {
    let store = state.store.clone();
    let deleted = blocking(move || store.delete(&request.query)).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

async fn map_marker<B: DocumentBackend + 'static>(
    State(state): State<Arc<DashboardState<B>>>,
    Query(params): Query<MapParams>,
) -> ApiResult<Json<MapMarker>> {
    let store = state.store.clone();
    let records = blocking(move || store.read(&empty_mapping(), None, 0)).await?;
    let view = TableView::from_records(records);
    select_marker(&view.rows, params.row)
        .map(Json)
        .ok_or(ApiError::RowOutOfRange(params.row.unwrap_or(0)))
}

async fn login<B: DocumentBackend + 'static>(
    State(state): State<Arc<DashboardState<B>>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginOutcome>> {
    let probe = state.login.clone();
    let outcome = tokio::task::spawn_blocking(move || probe.run(&request.username, &request.password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(outcome))
}
