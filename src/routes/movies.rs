use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{MovieId, MovieListKind, MovieSummary, RatingSummary, Review, Session},
    routes::{current_year, AppState},
    services::{
        details::{self, HomeView, MovieView},
        ratings::validate_stars,
        recommendations::rank_by_genre_affinity,
    },
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// A listing page with its watchlist-driven picks
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieSummary>,
    pub recommendations: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: f64,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub content: String,
}

/// Remote failures on browse pages degrade to an empty result
fn empty_on_remote_error(
    result: AppResult<Vec<MovieSummary>>,
    context: &str,
) -> AppResult<Vec<MovieSummary>> {
    match result {
        Err(e) if e.is_remote() => {
            tracing::warn!(context = %context, error = %e, "Catalog unavailable, returning no movies");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Handler for movie search endpoint
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    let movies = empty_on_remote_error(
        state.inner.catalog.search_movies(&params.q).await,
        "search",
    )?;
    Ok(Json(
        movies.into_iter().map(MovieSummary::with_genre_names).collect(),
    ))
}

/// Featured, popular and upcoming movies; empty when the catalog fails
pub async fn home(State(state): State<AppState>) -> AppResult<Json<HomeView>> {
    match details::home_view(state.inner.catalog.as_ref()).await {
        Ok(home) => Ok(Json(home)),
        Err(e) if e.is_remote() => {
            tracing::warn!(error = %e, "Catalog unavailable, returning empty home page");
            Ok(Json(HomeView::default()))
        }
        Err(e) => Err(e),
    }
}

/// Curated listing plus the genre-affinity picks drawn from it
pub async fn list(
    State(state): State<AppState>,
    Path(kind): Path<MovieListKind>,
) -> AppResult<Json<MovieListResponse>> {
    let kind_name = kind.to_string();
    let movies: Vec<MovieSummary> = empty_on_remote_error(
        state.inner.catalog.movie_list(kind).await,
        &kind_name,
    )?
    .into_iter()
    .map(MovieSummary::with_genre_names)
    .collect();

    let watchlist = state.inner.watchlist.lock().await.list().to_vec();
    let recommendations = rank_by_genre_affinity(&movies, &watchlist, current_year());

    Ok(Json(MovieListResponse {
        movies,
        recommendations,
    }))
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<MovieView>> {
    let view = details::movie_view(
        state.inner.catalog.as_ref(),
        &state.inner.ratings,
        movie_id,
        &session,
    )
    .await?;
    Ok(Json(view))
}

/// Stored rating summary, without contacting the catalog
pub async fn rating(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(movie_id): Path<MovieId>,
) -> Json<RatingSummary> {
    Json(
        state
            .inner
            .ratings
            .lock()
            .await
            .summary(movie_id, &session)
            .await,
    )
}

/// Records the session user's star rating
pub async fn rate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(movie_id): Path<MovieId>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<RatingSummary>> {
    let stars = validate_stars(request.rating)?;
    let summary = state
        .inner
        .ratings
        .lock()
        .await
        .record_user_rating(movie_id, &session, stars)
        .await?;

    tracing::info!(
        movie_id,
        user_id = %session.user_id,
        rating = stars,
        "User rating recorded"
    );

    Ok(Json(summary))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> Json<Vec<Review>> {
    Json(state.inner.reviews.lock().await.list_reviews(movie_id).await)
}

pub async fn add_review(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(movie_id): Path<MovieId>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state
        .inner
        .reviews
        .lock()
        .await
        .add_review(movie_id, &session, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
