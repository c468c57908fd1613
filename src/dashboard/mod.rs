//! # Records Dashboard
//!
//! HTTP front end over a [`RecordStore`](crate::store::RecordStore): a
//! paginated table, a map marker for the selected row, CRUD endpoints and a
//! login probe.
//!
//! ## Endpoints
//!
//! - `GET /health` - liveness probe result
//! - `GET /api/records` - table view of the whole collection
//! - `POST /api/records/query` - filtered read
//! - `POST /api/records` - insert one record
//! - `PATCH /api/records` - merge fields into matching records
//! - `DELETE /api/records` - remove matching records
//! - `GET /api/map?row=N` - marker for row `N` (default 0)
//! - `POST /api/login` - try credentials against the sample query

mod config;
mod errors;
mod login;
mod marker;
mod routes;
mod server;
mod table;

pub use config::DashboardConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use login::{
    sample_query, BackendConnector, LoginOutcome, LoginProbe, LOGIN_SAMPLE_LIMIT,
    NO_RESULTS_MESSAGE,
};
pub use marker::{
    marker_for, select_marker, MapMarker, DEFAULT_ZOOM, FALLBACK_LATITUDE, FALLBACK_LONGITUDE,
};
pub use routes::{dashboard_routes, DashboardState, HealthResponse, QueryResponse};
pub use server::DashboardServer;
pub use table::{TableView, PAGE_SIZE};
