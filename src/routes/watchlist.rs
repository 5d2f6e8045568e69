use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{MovieId, MovieSummary, WatchlistMovie},
    routes::{current_year, AppState},
    services::recommendations::{recommend_from_watchlist, Recommendation},
};

pub async fn list(State(state): State<AppState>) -> Json<Vec<WatchlistMovie>> {
    Json(state.inner.watchlist.lock().await.list().to_vec())
}

/// Normalizes a catalog movie into a watchlist entry and adds it.
/// Adding a movie already on the watchlist is a no-op answered with 200.
pub async fn add(
    State(state): State<AppState>,
    Json(summary): Json<MovieSummary>,
) -> AppResult<(StatusCode, Json<Vec<WatchlistMovie>>)> {
    let movie = WatchlistMovie::from_summary(summary, &state.inner.image_base);
    let mut watchlist = state.inner.watchlist.lock().await;
    let added = watchlist.add(movie).await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(watchlist.list().to_vec())))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<StatusCode> {
    state.inner.watchlist.lock().await.remove(movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Similarity recommendations seeded from a random watchlist entry
pub async fn recommendations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let recommendations = recommend_from_watchlist(
        state.inner.catalog.as_ref(),
        &state.inner.watchlist,
        &state.inner.recommendations,
        current_year(),
    )
    .await?;
    Ok(Json(recommendations))
}
