//! Page, record, search and category endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bestiary_core::{
    repository::checked_page_for_offset, CatalogRecord, CategoryListing, PaginationWindow,
};
use serde::{Deserialize, Serialize};

use super::handlers::{bad_request, store_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for fetching a page.
#[derive(Debug, Deserialize)]
pub struct FetchPageBody {
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

/// Request body for a search.
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub term: String,
}

/// Filtered view after a search or after clearing it.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub term: String,
    pub records: Vec<CatalogRecord>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Fetch an arbitrary page (limit defaults to the configured page size).
pub async fn fetch_page(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FetchPageBody>,
) -> Result<Json<PaginationWindow>, ApiError> {
    let limit = body.limit.unwrap_or(state.config().fetch.page_size);
    if limit == 0 {
        return Err(bad_request("limit must be greater than 0"));
    }
    if checked_page_for_offset(limit, body.offset).is_none() {
        return Err(bad_request(format!(
            "offset {} is out of range for limit {}",
            body.offset, limit
        )));
    }

    state
        .store()
        .fetch_page(limit, body.offset)
        .await
        .map(Json)
        .map_err(store_error)
}

pub async fn next_page(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PaginationWindow>, ApiError> {
    state
        .store()
        .go_to_next_page()
        .await
        .map(Json)
        .map_err(store_error)
}

pub async fn previous_page(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PaginationWindow>, ApiError> {
    state
        .store()
        .go_to_previous_page()
        .await
        .map(Json)
        .map_err(store_error)
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PaginationWindow>, ApiError> {
    state.store().refresh().await.map(Json).map_err(store_error)
}

/// Fetch one record and merge it into the loaded page.
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<CatalogRecord>, ApiError> {
    state
        .store()
        .fetch_record(id)
        .await
        .map(Json)
        .map_err(store_error)
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let records = state
        .store()
        .set_search_term(&body.term)
        .await
        .map_err(store_error)?;

    Ok(Json(SearchResponse {
        term: state.store().state().await.search_term,
        records,
    }))
}

pub async fn clear_search(State(state): State<Arc<AppState>>) -> Json<SearchResponse> {
    let records = state.store().clear_search().await;
    Json(SearchResponse {
        term: String::new(),
        records,
    })
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state
        .store()
        .load_categories()
        .await
        .map_err(store_error)?;

    Ok(Json(CategoriesResponse { categories }))
}

/// Replace the filtered view with a category's members.
pub async fn filter_by_category(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<CategoryListing>, ApiError> {
    state
        .store()
        .filter_by_category(&name)
        .await
        .map(Json)
        .map_err(store_error)
}
