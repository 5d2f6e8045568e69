/// Remote movie catalog abstraction
///
/// The service only consumes the catalog: search, movie details and credits,
/// related movies, people and curated listings. [`tmdb::TmdbClient`] is the
/// production implementation; tests substitute mocks or stubs.
use crate::{
    error::AppResult,
    models::{
        CastMember, MovieDetails, MovieId, MovieListKind, MovieSummary, PersonDetails, PersonId,
    },
};

pub mod tmdb;

pub use tmdb::TmdbClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search movies by free text, in catalog relevance order
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>>;

    /// Full record including aggregate rating, vote count, runtime and genres
    async fn movie_details(&self, movie_id: MovieId) -> AppResult<MovieDetails>;

    /// Cast in billing order
    async fn movie_credits(&self, movie_id: MovieId) -> AppResult<Vec<CastMember>>;

    /// Movies the catalog relates to `movie_id`
    async fn related_movies(&self, movie_id: MovieId) -> AppResult<Vec<MovieSummary>>;

    async fn person_details(&self, person_id: PersonId) -> AppResult<PersonDetails>;

    /// Movies the person appeared in
    async fn person_movie_credits(&self, person_id: PersonId) -> AppResult<Vec<MovieSummary>>;

    /// First page of a curated listing
    async fn movie_list(&self, kind: MovieListKind) -> AppResult<Vec<MovieSummary>>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}
