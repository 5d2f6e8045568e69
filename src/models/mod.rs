use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod genre;
pub mod rating;
pub mod review;
pub mod session;

pub use genre::{genre_name, genre_names_or_unknown, known_genre_names};
pub use rating::{RatingRecord, RatingSummary, RemoteAggregate};
pub use review::Review;
pub use session::Session;

/// TMDB movie identifier
pub type MovieId = u64;

/// TMDB person identifier
pub type PersonId = u64;

/// Poster shown when the catalog has no image for a movie
pub const PLACEHOLDER_POSTER: &str = "/api/placeholder/500/750";

/// Items held by an id-unique collection store
pub trait Keyed {
    fn key(&self) -> u64;
}

// ============================================================================
// Local collection types
// ============================================================================

/// An actor the user marked as favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: PersonId,
    pub name: String,
    #[serde(default, alias = "profile_path")]
    pub profile_path: String,
    #[serde(default)]
    pub character: String,
}

impl Keyed for Actor {
    fn key(&self) -> u64 {
        self.id
    }
}

impl From<CastMember> for Actor {
    fn from(member: CastMember) -> Self {
        Actor {
            id: member.id,
            name: member.name,
            profile_path: member.profile_path.unwrap_or_default(),
            character: member.character,
        }
    }
}

/// A movie on the user's watchlist, normalized at insertion time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistMovie {
    pub id: MovieId,
    pub title: String,
    #[serde(default, alias = "poster")]
    pub poster_url: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, alias = "vote_average")]
    pub vote_average: f64,
    #[serde(default = "unknown_release_date", alias = "release_date")]
    pub release_date: String,
    #[serde(default)]
    pub overview: String,
}

fn unknown_release_date() -> String {
    "Unknown".to_string()
}

impl Keyed for WatchlistMovie {
    fn key(&self) -> u64 {
        self.id
    }
}

impl WatchlistMovie {
    /// Builds a watchlist entry from a catalog summary.
    ///
    /// Genre ids are replaced by their names (unmapped ids are dropped),
    /// the poster path is joined onto `image_base`, and missing fields get
    /// display defaults.
    pub fn from_summary(summary: MovieSummary, image_base: &str) -> Self {
        let genres = if summary.genres.is_empty() {
            known_genre_names(&summary.genre_ids)
        } else {
            summary.genres
        };

        let poster_url = match summary.poster_path.as_deref() {
            Some(path) if !path.is_empty() => format!("{}{}", image_base, path),
            _ => PLACEHOLDER_POSTER.to_string(),
        };

        WatchlistMovie {
            id: summary.id,
            title: summary.title,
            poster_url,
            genres,
            vote_average: summary.vote_average.unwrap_or(0.0),
            release_date: summary
                .release_date
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(unknown_release_date),
            overview: summary
                .overview
                .filter(|o| !o.trim().is_empty())
                .unwrap_or_else(|| "No overview available".to_string()),
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        release_year(&self.release_date)
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Movie as returned by TMDB search, listing and recommendation endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Genre names, when the caller already resolved them
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl MovieSummary {
    /// Genre tags used for scoring: explicit names when present, otherwise
    /// the mapped genre ids with unmapped ids labelled "Unknown".
    pub fn genre_tags(&self) -> Vec<String> {
        if self.genres.is_empty() {
            genre_names_or_unknown(&self.genre_ids)
        } else {
            self.genres.clone()
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(release_year)
    }

    /// Copy with `genres` filled in from the genre ids
    pub fn with_genre_names(mut self) -> Self {
        if self.genres.is_empty() {
            self.genres = genre_names_or_unknown(&self.genre_ids);
        }
        self
    }
}

/// TMDB paged result envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreTag {
    pub id: u32,
    pub name: String,
}

/// Full movie record from GET /movie/{id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub genres: Vec<GenreTag>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl MovieDetails {
    pub fn remote_aggregate(&self) -> RemoteAggregate {
        RemoteAggregate {
            vote_average: self.vote_average,
            vote_count: self.vote_count,
        }
    }
}

/// One cast entry from GET /movie/{id}/credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub popularity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// Person record from GET /person/{id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDetails {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
}

impl PersonDetails {
    /// Age by calendar year, as displayed on the actor page
    pub fn age(&self, current_year: i32) -> Option<i32> {
        self.birthday
            .as_deref()
            .and_then(release_year)
            .map(|born| current_year - born)
    }
}

/// Movie credits from GET /person/{id}/movie_credits
#[derive(Debug, Clone, Deserialize)]
pub struct PersonCredits {
    #[serde(default)]
    pub cast: Vec<MovieSummary>,
}

/// Curated TMDB movie listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovieListKind {
    Popular,
    TopRated,
    Upcoming,
    Trending,
    TrendingWeek,
}

impl MovieListKind {
    /// Path of the listing relative to the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            MovieListKind::Popular => "movie/popular",
            MovieListKind::TopRated => "movie/top_rated",
            MovieListKind::Upcoming => "movie/upcoming",
            MovieListKind::Trending => "trending/movie/day",
            MovieListKind::TrendingWeek => "trending/movie/week",
        }
    }
}

impl Display for MovieListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MovieListKind::Popular => "popular",
            MovieListKind::TopRated => "top-rated",
            MovieListKind::Upcoming => "upcoming",
            MovieListKind::Trending => "trending",
            MovieListKind::TrendingWeek => "trending-week",
        };
        write!(f, "{}", name)
    }
}

/// Extracts the year from an ISO date (or bare year); `None` for "Unknown",
/// empty or otherwise unparseable values.
pub fn release_year(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    let prefix: String = date.chars().take(4).collect();
    if prefix.len() == 4 && prefix.chars().all(|c| c.is_ascii_digit()) {
        prefix.parse().ok()
    } else {
        None
    }
}
