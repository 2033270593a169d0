use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::metrics_middleware;
use super::{favorites, handlers, records, selection};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and state
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/state", get(handlers::get_state))
        // Pages
        .route("/pages", post(records::fetch_page))
        .route("/pages/next", post(records::next_page))
        .route("/pages/previous", post(records::previous_page))
        .route("/refresh", post(records::refresh))
        // Records and search
        .route("/records/{id}", get(records::get_record))
        .route(
            "/search",
            post(records::search).delete(records::clear_search),
        )
        // Categories
        .route("/categories", get(records::list_categories))
        .route("/categories/{name}", post(records::filter_by_category))
        // Selection
        .route("/selection", post(selection::select))
        .route("/selection/next", post(selection::select_next))
        .route("/selection/previous", post(selection::select_previous))
        // Favorites
        .route(
            "/favorites",
            get(favorites::list_favorites).delete(favorites::clear_favorites),
        )
        .route(
            "/favorites/{id}",
            put(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route("/favorites/{id}/toggle", post(favorites::toggle_favorite))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
