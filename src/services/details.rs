use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    error::AppResult,
    models::{
        CastMember, MovieDetails, MovieId, MovieListKind, MovieSummary, PersonDetails, PersonId,
        RatingSummary, Session,
    },
    services::{catalog::CatalogClient, ratings::RatingAggregator},
};

pub const MAIN_CAST_LIMIT: usize = 4;

/// Weekly trending movies featured at the top of the home page
pub const FEATURED_LIMIT: usize = 5;

/// Billing positions below this are shifted by [`TOP_BILLED_OFFSET`]
const TOP_BILLED: u32 = 5;
const TOP_BILLED_OFFSET: f64 = 10.0;

/// Movie page data: catalog record, main cast and blended rating
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieView {
    pub movie: MovieDetails,
    pub main_cast: Vec<CastMember>,
    pub rating: RatingSummary,
}

/// Actor page data
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
    pub person: PersonDetails,
    pub age: Option<i32>,
    pub movies: Vec<MovieSummary>,
}

/// Landing page data
#[derive(Debug, Clone, Default, Serialize)]
pub struct HomeView {
    pub featured: Vec<MovieSummary>,
    pub popular: Vec<MovieSummary>,
    pub upcoming: Vec<MovieSummary>,
}

/// Cast members with a profile image, highest ranking score first, limited
/// to [`MAIN_CAST_LIMIT`].
///
/// The score is popularity minus 10 for the top-billed. That ranks top
/// billing below equally popular supporting cast, which looks unintended, but
/// it is the ordering existing users see.
pub fn main_cast(cast: Vec<CastMember>) -> Vec<CastMember> {
    let ranking = |member: &CastMember| {
        if member.order < TOP_BILLED {
            member.popularity - TOP_BILLED_OFFSET
        } else {
            member.popularity
        }
    };

    let mut pictured: Vec<CastMember> = cast
        .into_iter()
        .filter(|member| member.profile_path.as_deref().is_some_and(|p| !p.is_empty()))
        .collect();

    pictured.sort_by(|a, b| ranking(b).total_cmp(&ranking(a)));
    pictured.truncate(MAIN_CAST_LIMIT);
    pictured
}

/// Fetches details and credits together; if either fails the whole view is
/// discarded. The rating snapshot is taken from the fetched details.
pub async fn movie_view(
    catalog: &dyn CatalogClient,
    ratings: &Mutex<RatingAggregator>,
    movie_id: MovieId,
    session: &Session,
) -> AppResult<MovieView> {
    let (movie, cast) = tokio::try_join!(
        catalog.movie_details(movie_id),
        catalog.movie_credits(movie_id)
    )
    .map_err(|e| {
        tracing::error!(movie_id, error = %e, "Movie detail fetch failed");
        e
    })?;

    let rating = ratings
        .lock()
        .await
        .load(movie_id, movie.remote_aggregate(), session)
        .await;

    Ok(MovieView {
        movie,
        main_cast: main_cast(cast),
        rating,
    })
}

/// Fetches a person and their movie credits together, all-or-nothing
pub async fn person_view(
    catalog: &dyn CatalogClient,
    person_id: PersonId,
    current_year: i32,
) -> AppResult<PersonView> {
    let (person, movies) = tokio::try_join!(
        catalog.person_details(person_id),
        catalog.person_movie_credits(person_id)
    )
    .map_err(|e| {
        tracing::error!(person_id, error = %e, "Person fetch failed");
        e
    })?;

    let age = person.age(current_year);
    Ok(PersonView {
        person,
        age,
        movies: movies.into_iter().map(MovieSummary::with_genre_names).collect(),
    })
}

/// Fetches the three home page listings together, all-or-nothing
pub async fn home_view(catalog: &dyn CatalogClient) -> AppResult<HomeView> {
    let (mut featured, popular, upcoming) = tokio::try_join!(
        catalog.movie_list(MovieListKind::TrendingWeek),
        catalog.movie_list(MovieListKind::Popular),
        catalog.movie_list(MovieListKind::Upcoming)
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Home page fetch failed");
        e
    })?;

    featured.truncate(FEATURED_LIMIT);
    let named = |movies: Vec<MovieSummary>| -> Vec<MovieSummary> {
        movies.into_iter().map(MovieSummary::with_genre_names).collect()
    };

    Ok(HomeView {
        featured: named(featured),
        popular: named(popular),
        upcoming: named(upcoming),
    })
}
