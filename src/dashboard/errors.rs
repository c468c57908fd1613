//! Dashboard API errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by dashboard handlers
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Error from the record store, reported with its own code
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Selected row does not exist
    #[error("Row {0} is out of range")]
    RowOutOfRange(usize),

    /// Blocking task was cancelled or panicked
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Configuration(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(StoreError::Backend(_)) => StatusCode::BAD_GATEWAY,
            ApiError::RowOutOfRange(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Store(e) => e.code(),
            ApiError::RowOutOfRange(_) => "SHELTER_ROW_OUT_OF_RANGE",
            ApiError::Internal(_) => "SHELTER_INTERNAL_ERROR",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.code(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}
