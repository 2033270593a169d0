//! Favorites endpoints. Every mutation is persisted before responding.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bestiary_core::FavoriteIds;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub ids: Vec<u32>,
    pub count: usize,
}

impl From<FavoriteIds> for FavoritesResponse {
    fn from(ids: FavoriteIds) -> Self {
        Self {
            count: ids.len(),
            ids: ids.iter().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: u32,
    pub favorite: bool,
}

pub async fn list_favorites(State(state): State<Arc<AppState>>) -> Json<FavoritesResponse> {
    Json(state.store().favorite_ids().await.into())
}

pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Json<ToggleResponse> {
    let favorite = state.store().toggle_favorite(id).await;
    Json(ToggleResponse { id, favorite })
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Json<FavoritesResponse> {
    Json(state.store().add_favorite(id).await.into())
}

pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Json<FavoritesResponse> {
    Json(state.store().remove_favorite(id).await.into())
}

pub async fn clear_favorites(State(state): State<Arc<AppState>>) -> Json<FavoritesResponse> {
    state.store().clear_favorites().await;
    Json(state.store().favorite_ids().await.into())
}
