use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::PersonId,
    routes::{current_year, AppState},
    services::details::{self, PersonView},
};

pub async fn detail(
    State(state): State<AppState>,
    Path(person_id): Path<PersonId>,
) -> AppResult<Json<PersonView>> {
    let view = details::person_view(state.inner.catalog.as_ref(), person_id, current_year()).await?;
    Ok(Json(view))
}
