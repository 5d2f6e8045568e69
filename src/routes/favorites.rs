use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{Actor, PersonId},
    routes::AppState,
};

pub async fn list(State(state): State<AppState>) -> Json<Vec<Actor>> {
    Json(state.inner.favorites.lock().await.list().to_vec())
}

/// Adds an actor; re-adding a favorite is a no-op answered with 200
pub async fn add(
    State(state): State<AppState>,
    Json(actor): Json<Actor>,
) -> AppResult<(StatusCode, Json<Vec<Actor>>)> {
    let mut favorites = state.inner.favorites.lock().await;
    let added = favorites.add(actor).await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(favorites.list().to_vec())))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(actor_id): Path<PersonId>,
) -> AppResult<StatusCode> {
    state.inner.favorites.lock().await.remove(actor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
