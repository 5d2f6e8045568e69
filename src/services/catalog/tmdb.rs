/// TMDB (themoviedb.org) catalog client
///
/// Every request carries the deployment's API key as the `api_key` query
/// parameter. Non-2xx responses become `AppError::ExternalApi` with the
/// status and body.
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{
        CastMember, Credits, MovieDetails, MovieId, MovieListKind, MovieSummary, Page,
        PersonCredits, PersonDetails, PersonId,
    },
    services::catalog::CatalogClient,
};

const LANGUAGE: &str = "en-US";

/// A 404 means the requested movie or person does not exist; any other
/// failure status is an upstream error
fn status_error(path: &str, status: StatusCode, body: &str) -> AppError {
    if status == StatusCode::NOT_FOUND {
        AppError::NotFound(format!("No TMDB resource at {}", path))
    } else {
        AppError::ExternalApi(format!("TMDB API returned status {}: {}", status, body))
    }
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> AppResult<T> {
        let url = self.endpoint(path);

        tracing::debug!(path = %path, "Fetching from TMDB");

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(status_error(path, status, &body));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(path = %path, error = %e, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl CatalogClient for TmdbClient {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        if query.trim().is_empty() {
            return Err(AppError::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page: Page<MovieSummary> = self
            .get_json(
                "search/movie",
                &[("query", query), ("language", LANGUAGE), ("page", "1")],
            )
            .await?;

        tracing::info!(
            query = %query,
            results = page.results.len(),
            catalog = "tmdb",
            "Movie search completed"
        );

        Ok(page.results)
    }

    async fn movie_details(&self, movie_id: MovieId) -> AppResult<MovieDetails> {
        self.get_json(&format!("movie/{}", movie_id), &[("language", LANGUAGE)])
            .await
    }

    async fn movie_credits(&self, movie_id: MovieId) -> AppResult<Vec<CastMember>> {
        let credits: Credits = self
            .get_json(&format!("movie/{}/credits", movie_id), &[])
            .await?;
        Ok(credits.cast)
    }

    async fn related_movies(&self, movie_id: MovieId) -> AppResult<Vec<MovieSummary>> {
        let page: Page<MovieSummary> = self
            .get_json(&format!("movie/{}/recommendations", movie_id), &[])
            .await?;

        tracing::info!(
            movie_id,
            results = page.results.len(),
            catalog = "tmdb",
            "Related movies fetched"
        );

        Ok(page.results)
    }

    async fn person_details(&self, person_id: PersonId) -> AppResult<PersonDetails> {
        self.get_json(&format!("person/{}", person_id), &[]).await
    }

    async fn person_movie_credits(&self, person_id: PersonId) -> AppResult<Vec<MovieSummary>> {
        let credits: PersonCredits = self
            .get_json(&format!("person/{}/movie_credits", person_id), &[])
            .await?;
        Ok(credits.cast)
    }

    async fn movie_list(&self, kind: MovieListKind) -> AppResult<Vec<MovieSummary>> {
        let params: &[(&str, &str)] = match kind {
            MovieListKind::Trending | MovieListKind::TrendingWeek => &[],
            _ => &[("language", LANGUAGE), ("page", "1")],
        };
        let page: Page<MovieSummary> = self.get_json(kind.endpoint(), params).await?;

        tracing::info!(list = %kind, results = page.results.len(), "Movie list fetched");

        Ok(page.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
