use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bestiary_core::{Config, RepositoryError, StateView, StoreError};
use serde::Serialize;

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a store failure to its HTTP status.
pub fn store_error(err: StoreError) -> ApiError {
    let status = match &err {
        StoreError::NoNextPage | StoreError::NoPreviousPage => StatusCode::BAD_REQUEST,
        StoreError::Superseded(_) => StatusCode::CONFLICT,
        StoreError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
        StoreError::Repository(RepositoryError::Network(_))
        | StoreError::Repository(RepositoryError::DataParsing(_)) => StatusCode::BAD_GATEWAY,
        StoreError::Repository(RepositoryError::Other(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

/// Full state snapshot with derived values.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateView> {
    Json(state.store().view().await)
}

/// Prometheus text exposition.
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
