use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinemate_api::{
    db::{KeyValueStore, MemoryStore, StoreKey},
    error::{AppError, AppResult},
    models::{
        CastMember, MovieDetails, MovieId, MovieListKind, MovieSummary, PersonDetails, PersonId,
        Session,
    },
    routes::{create_router, AppState, StateSettings},
    services::CatalogClient,
};

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const UNKNOWN_MOVIE: MovieId = 999_999;

/// Canned catalog; `fail` turns every call into an upstream error
struct StubCatalog {
    fail: bool,
}

fn summary(id: MovieId, genre_ids: Vec<u32>, vote_average: f64) -> MovieSummary {
    MovieSummary {
        id,
        title: format!("Movie {}", id),
        poster_path: Some(format!("/{}.jpg", id)),
        vote_average: Some(vote_average),
        vote_count: Some(100),
        release_date: Some("1999-03-30".to_string()),
        genre_ids,
        genres: vec![],
        overview: Some("An overview".to_string()),
    }
}

impl StubCatalog {
    fn check(&self) -> AppResult<()> {
        if self.fail {
            Err(AppError::ExternalApi("TMDB API returned status 503".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl CatalogClient for StubCatalog {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Search query cannot be empty".to_string()));
        }
        self.check()?;
        Ok(vec![summary(603, vec![28, 878], 8.2)])
    }

    async fn movie_details(&self, movie_id: MovieId) -> AppResult<MovieDetails> {
        self.check()?;
        if movie_id == UNKNOWN_MOVIE {
            return Err(AppError::NotFound(format!("No TMDB resource at movie/{}", movie_id)));
        }
        Ok(MovieDetails {
            id: movie_id,
            title: "The Matrix".to_string(),
            tagline: None,
            overview: None,
            runtime: Some(136),
            release_date: Some("1999-03-30".to_string()),
            vote_average: 7.0,
            vote_count: 100,
            genres: vec![],
            poster_path: None,
            backdrop_path: None,
        })
    }

    async fn movie_credits(&self, _movie_id: MovieId) -> AppResult<Vec<CastMember>> {
        self.check()?;
        Ok(vec![CastMember {
            id: 6384,
            name: "Keanu Reeves".to_string(),
            profile_path: Some("/keanu.jpg".to_string()),
            character: "Neo".to_string(),
            order: 0,
            popularity: 45.0,
        }])
    }

    async fn related_movies(&self, _movie_id: MovieId) -> AppResult<Vec<MovieSummary>> {
        self.check()?;
        Ok(vec![summary(604, vec![28], 7.0)])
    }

    async fn person_details(&self, person_id: PersonId) -> AppResult<PersonDetails> {
        self.check()?;
        Ok(PersonDetails {
            id: person_id,
            name: "Keanu Reeves".to_string(),
            profile_path: None,
            birthday: None,
            place_of_birth: None,
            biography: None,
            known_for_department: None,
        })
    }

    async fn person_movie_credits(&self, _person_id: PersonId) -> AppResult<Vec<MovieSummary>> {
        self.check()?;
        Ok(vec![summary(603, vec![28], 8.2)])
    }

    async fn movie_list(&self, _kind: MovieListKind) -> AppResult<Vec<MovieSummary>> {
        self.check()?;
        Ok(vec![summary(500, vec![28, 12], 7.5)])
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn settings() -> StateSettings {
    StateSettings {
        image_base: IMAGE_BASE.to_string(),
        default_session: Session::new("user1", "Movie Fan"),
        recommendation_seed: Some(7),
    }
}

async fn create_server_with(store: Arc<MemoryStore>, fail: bool) -> TestServer {
    let state = AppState::new(store, Arc::new(StubCatalog { fail }), settings()).await;
    TestServer::new(create_router(state)).unwrap()
}

async fn create_test_server() -> TestServer {
    create_server_with(Arc::new(MemoryStore::new()), false).await
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = create_test_server().await;
    let id = "6f9619ff-8b86-4011-b42d-00c04fc964ff";
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id").to_str().unwrap(), id);
}

#[tokio::test]
async fn test_favorites_add_is_idempotent() {
    let server = create_test_server().await;
    let actor = json!({ "id": 6384, "name": "Keanu Reeves", "profilePath": "/k.jpg" });

    let response = server.post("/api/v1/favorites").json(&actor).await;
    response.assert_status(StatusCode::CREATED);

    let response = server.post("/api/v1/favorites").json(&actor).await;
    response.assert_status_ok();
    let favorites: Vec<Value> = response.json();
    assert_eq!(favorites.len(), 1);

    server
        .delete("/api/v1/favorites/6384")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/api/v1/favorites/6384")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let favorites: Vec<Value> = server.get("/api/v1/favorites").await.json();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn test_favorites_survive_restart() {
    let store = Arc::new(MemoryStore::new());
    let server = create_server_with(store.clone(), false).await;
    server
        .post("/api/v1/favorites")
        .json(&json!({ "id": 1, "name": "Carrie-Anne Moss" }))
        .await
        .assert_status(StatusCode::CREATED);

    let raw = store.get(&StoreKey::FavoriteActors).await;
    tokio_test::assert_ok!(&raw);

    let restarted = create_server_with(store, false).await;
    let favorites: Vec<Value> = restarted.get("/api/v1/favorites").await.json();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["name"], "Carrie-Anne Moss");
}

#[tokio::test]
async fn test_watchlist_entry_normalized() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/watchlist")
        .json(&json!({
            "id": 603,
            "title": "The Matrix",
            "poster_path": "/matrix.jpg",
            "genre_ids": [28, 99999],
            "vote_average": 8.2
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let watchlist: Vec<Value> = response.json();
    assert_eq!(watchlist[0]["posterUrl"], format!("{}/matrix.jpg", IMAGE_BASE));
    assert_eq!(watchlist[0]["genres"], json!(["Action"]));
    assert_eq!(watchlist[0]["releaseDate"], "Unknown");

    let response = server
        .post("/api/v1/watchlist")
        .json(&json!({ "id": 604, "title": "No Poster" }))
        .await;
    let watchlist: Vec<Value> = response.json();
    assert_eq!(watchlist[1]["posterUrl"], "/api/placeholder/500/750");
}

#[tokio::test]
async fn test_out_of_range_rating_rejected() {
    let store = Arc::new(MemoryStore::new());
    let server = create_server_with(store.clone(), false).await;

    let response = server
        .put("/api/v1/movies/42/rating")
        .json(&json!({ "rating": 6 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    server
        .put("/api/v1/movies/42/rating")
        .json(&json!({ "rating": 3.5 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(store.get(&StoreKey::MovieRatings(42)).await.unwrap(), None);
}

#[tokio::test]
async fn test_rating_blends_with_snapshot() {
    let server = create_test_server().await;

    // first view takes the 7.0 / 100 votes snapshot
    let view: Value = server.get("/api/v1/movies/603").await.json();
    assert_eq!(view["rating"]["totalRatings"], 100);
    assert_eq!(view["mainCast"][0]["name"], "Keanu Reeves");

    let response = server
        .put("/api/v1/movies/603/rating")
        .json(&json!({ "rating": 5 }))
        .await;
    response.assert_status_ok();

    let summary: Value = response.json();
    assert_eq!(summary["totalRatings"], 101);
    assert_eq!(summary["userRating"], 5);
    let blended = summary["blendedRating"].as_f64().unwrap();
    assert!((blended - 705.0 / 101.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_reviews_append_in_order() {
    let server = create_test_server().await;

    server
        .post("/api/v1/movies/603/reviews")
        .json(&json!({ "content": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/v1/movies/603/reviews")
        .json(&json!({ "content": "Great" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/movies/603/reviews")
        .add_header(
            HeaderName::from_static("x-username"),
            HeaderValue::from_static("Cinephile"),
        )
        .json(&json!({ "content": "  Still great  " }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let reviews: Vec<Value> = server.get("/api/v1/movies/603/reviews").await.json();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["content"], "Great");
    assert_eq!(reviews[0]["username"], "Movie Fan");
    assert_eq!(reviews[1]["content"], "Still great");
    assert_eq!(reviews[1]["username"], "Cinephile");
    assert_ne!(reviews[0]["id"], reviews[1]["id"]);
}

#[tokio::test]
async fn test_genre_affinity_ranking() {
    let server = create_test_server().await;
    for (id, genres) in [(1, json!([28, 878])), (2, json!([28]))] {
        server
            .post("/api/v1/watchlist")
            .json(&json!({ "id": id, "title": "Watched", "genre_ids": genres }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .post("/api/v1/recommendations/genre-affinity")
        .json(&json!({
            "candidates": [
                { "id": 1, "title": "Watched", "genre_ids": [28] },
                { "id": 10, "title": "Action", "genre_ids": [28], "vote_average": 6.0, "release_date": "1990-01-01" },
                { "id": 11, "title": "Comedy", "genre_ids": [35], "vote_average": 5.0, "release_date": "1990-01-01" },
                { "id": 12, "title": "Sci-fi action", "genre_ids": [28, 878], "vote_average": 6.0, "release_date": "1990-01-01" }
            ]
        }))
        .await;
    response.assert_status_ok();

    let ranked: Vec<Value> = response.json();
    let ids: Vec<u64> = ranked.iter().map(|m| m["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![12, 10, 11]);
}

#[tokio::test]
async fn test_movie_list_names_genres() {
    let server = create_test_server().await;
    let response = server.get("/api/v1/movies/lists/top-rated").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["movies"][0]["genres"], json!(["Action", "Adventure"]));
    assert_eq!(body["recommendations"], json!([]));
}

#[tokio::test]
async fn test_similarity_recommendations_empty_watchlist() {
    let server = create_test_server().await;
    let response = server.get("/api/v1/watchlist/recommendations").await;
    response.assert_status_ok();
    let recommendations: Vec<Value> = response.json();
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn test_similarity_recommendations_from_watchlist() {
    let server = create_test_server().await;
    server
        .post("/api/v1/watchlist")
        .json(&json!({ "id": 603, "title": "The Matrix", "genre_ids": [28] }))
        .await;

    let recommendations: Vec<Value> = server
        .get("/api/v1/watchlist/recommendations")
        .await
        .json();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["movie"]["id"], 604);
    // 5 * 7.0 + 10 for the shared Action genre
    assert_eq!(recommendations[0]["matchScore"], 45);
}

#[tokio::test]
async fn test_catalog_failure_on_detail_is_bad_gateway() {
    let server = create_server_with(Arc::new(MemoryStore::new()), true).await;
    let response = server.get("/api/v1/movies/603").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_home_page_lists() {
    let server = create_test_server().await;
    let response = server.get("/api/v1/movies/home").await;
    response.assert_status_ok();

    let home: Value = response.json();
    assert_eq!(home["featured"][0]["id"], 500);
    assert_eq!(home["popular"][0]["genres"], json!(["Action", "Adventure"]));
    assert_eq!(home["upcoming"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_home_page_empty_when_catalog_fails() {
    let server = create_server_with(Arc::new(MemoryStore::new()), true).await;
    let response = server.get("/api/v1/movies/home").await;
    response.assert_status_ok();

    let home: Value = response.json();
    assert_eq!(home["featured"], json!([]));
    assert_eq!(home["popular"], json!([]));
}

#[tokio::test]
async fn test_unknown_movie_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let server = create_server_with(store.clone(), false).await;

    let response = server.get(&format!("/api/v1/movies/{}", UNKNOWN_MOVIE)).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let stored = store.get(&StoreKey::MovieRatings(UNKNOWN_MOVIE)).await.unwrap();
    assert_eq!(stored, None);
}

#[tokio::test]
async fn test_catalog_failure_on_browse_is_empty() {
    let server = create_server_with(Arc::new(MemoryStore::new()), true).await;

    let movies: Vec<Value> = server.get("/api/v1/movies/search?q=matrix").await.json();
    assert!(movies.is_empty());

    server
        .get("/api/v1/movies/search?q=")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
