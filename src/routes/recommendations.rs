use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    models::MovieSummary,
    routes::{current_year, AppState},
    services::recommendations::rank_by_genre_affinity,
};

#[derive(Debug, Deserialize)]
pub struct GenreAffinityRequest {
    pub candidates: Vec<MovieSummary>,
}

/// Ranks caller-supplied candidates against the current watchlist
pub async fn genre_affinity(
    State(state): State<AppState>,
    Json(request): Json<GenreAffinityRequest>,
) -> Json<Vec<MovieSummary>> {
    let watchlist = state.inner.watchlist.lock().await.list().to_vec();
    let ranked = rank_by_genre_affinity(&request.candidates, &watchlist, current_year());

    tracing::debug!(
        candidates = request.candidates.len(),
        recommended = ranked.len(),
        "Ranked candidates by genre affinity"
    );

    Json(ranked.into_iter().map(MovieSummary::with_genre_names).collect())
}
