use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Datelike;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, session_middleware};

pub mod favorites;
pub mod movies;
pub mod people;
pub mod recommendations;
pub mod state;
pub mod watchlist;

pub use state::{AppState, AppStateInner, StateSettings};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    session_middleware,
                ))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/movies/home", get(movies::home))
        .route("/movies/search", get(movies::search))
        .route("/movies/lists/:kind", get(movies::list))
        .route("/movies/:id", get(movies::detail))
        .route("/movies/:id/rating", get(movies::rating).put(movies::rate))
        .route(
            "/movies/:id/reviews",
            get(movies::list_reviews).post(movies::add_review),
        )
        .route("/people/:id", get(people::detail))
        .route("/favorites", get(favorites::list).post(favorites::add))
        .route("/favorites/:id", delete(favorites::remove))
        .route("/watchlist", get(watchlist::list).post(watchlist::add))
        .route("/watchlist/:id", delete(watchlist::remove))
        .route("/watchlist/recommendations", get(watchlist::recommendations))
        .route(
            "/recommendations/genre-affinity",
            post(recommendations::genre_affinity),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub(crate) fn current_year() -> i32 {
    chrono::Utc::now().year()
}
