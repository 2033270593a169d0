//! Detail-view selection endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use bestiary_core::{store::selected_record, CatalogRecord};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Request body for selecting a record; `null` closes the selection.
#[derive(Debug, Deserialize)]
pub struct SelectBody {
    pub id: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected_id: Option<u32>,
    pub record: Option<CatalogRecord>,
}

async fn selection(state: &AppState) -> SelectionResponse {
    let snapshot = state.store().state().await;
    SelectionResponse {
        selected_id: snapshot.selected_id,
        record: selected_record(&snapshot).cloned(),
    }
}

pub async fn select(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectBody>,
) -> Json<SelectionResponse> {
    state.store().select_record(body.id).await;
    Json(selection(&state).await)
}

pub async fn select_next(State(state): State<Arc<AppState>>) -> Json<SelectionResponse> {
    state.store().select_next().await;
    Json(selection(&state).await)
}

pub async fn select_previous(State(state): State<Arc<AppState>>) -> Json<SelectionResponse> {
    state.store().select_previous().await;
    Json(selection(&state).await)
}
