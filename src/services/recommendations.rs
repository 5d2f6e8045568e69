//! Watchlist-driven movie recommendations.
//!
//! Two independent rankings:
//!
//! - **Genre affinity** ranks an arbitrary candidate list against the genre
//!   histogram of the watchlist ([`rank_by_genre_affinity`]).
//! - **Similarity** ranks the catalog's "related movies" feed for one
//!   watchlist entry ([`rank_by_similarity`]). The entry is drawn at random on
//!   every recomputation, so results differ between calls unless the engine
//!   was built with a fixed seed.
//!
//! Missing candidate fields (genres, rating, release date) score as zero;
//! ranking never fails.

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use crate::{
    error::AppResult,
    models::{MovieId, MovieSummary, WatchlistMovie},
    services::{catalog::CatalogClient, collections::WatchlistStore},
};

pub const GENRE_AFFINITY_LIMIT: usize = 10;
pub const SIMILARITY_LIMIT: usize = 8;

/// Years back (inclusive) a release still counts as recent
const RECENT_YEARS: i32 = 2;

/// A related movie with its rounded match indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub movie: MovieSummary,
    pub match_score: i64,
}

fn is_recent(release_year: Option<i32>, current_year: i32) -> bool {
    release_year.is_some_and(|year| current_year - year <= RECENT_YEARS)
}

fn sort_descending<T>(scored: &mut [(T, f64)]) {
    // stable: equal scores keep candidate order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}

/// Count of every genre tag across the watchlist
pub fn genre_frequencies(watchlist: &[WatchlistMovie]) -> HashMap<&str, u32> {
    let mut frequencies = HashMap::new();
    for movie in watchlist {
        for genre in &movie.genres {
            *frequencies.entry(genre.as_str()).or_insert(0) += 1;
        }
    }
    frequencies
}

/// `2 * frequency` per shared genre, `10 * (rating - 7)` above a 7 rating,
/// and a flat 10 for releases from the last two years
pub fn genre_affinity_score(
    candidate: &MovieSummary,
    frequencies: &HashMap<&str, u32>,
    current_year: i32,
) -> f64 {
    let mut score = 0.0;

    for genre in candidate.genre_tags() {
        score += 2.0 * f64::from(frequencies.get(genre.as_str()).copied().unwrap_or(0));
    }

    let rating = candidate.vote_average.unwrap_or(0.0);
    if rating > 7.0 {
        score += (rating - 7.0) * 10.0;
    }

    if is_recent(candidate.release_year(), current_year) {
        score += 10.0;
    }

    score
}

/// Top candidates by genre affinity, excluding anything already watchlisted.
/// Empty when the watchlist is empty.
pub fn rank_by_genre_affinity(
    candidates: &[MovieSummary],
    watchlist: &[WatchlistMovie],
    current_year: i32,
) -> Vec<MovieSummary> {
    if watchlist.is_empty() {
        return Vec::new();
    }

    let frequencies = genre_frequencies(watchlist);
    let watched: HashSet<MovieId> = watchlist.iter().map(|m| m.id).collect();

    let mut scored: Vec<(&MovieSummary, f64)> = candidates
        .iter()
        .filter(|candidate| !watched.contains(&candidate.id))
        .map(|candidate| {
            (
                candidate,
                genre_affinity_score(candidate, &frequencies, current_year),
            )
        })
        .collect();

    sort_descending(&mut scored);

    scored
        .into_iter()
        .take(GENRE_AFFINITY_LIMIT)
        .map(|(candidate, _)| candidate.clone())
        .collect()
}

/// `5 * rating`, `10` per candidate genre found anywhere in the watchlist,
/// and a flat 20 for releases from the last two years
pub fn similarity_score(
    candidate: &MovieSummary,
    watchlist_genres: &HashSet<&str>,
    current_year: i32,
) -> f64 {
    let mut score = candidate.vote_average.unwrap_or(0.0) * 5.0;

    let matching = candidate
        .genre_tags()
        .iter()
        .filter(|genre| watchlist_genres.contains(genre.as_str()))
        .count();
    score += matching as f64 * 10.0;

    if is_recent(candidate.release_year(), current_year) {
        score += 20.0;
    }

    score
}

/// Top related movies by similarity, excluding anything already watchlisted
pub fn rank_by_similarity(
    related: &[MovieSummary],
    watchlist: &[WatchlistMovie],
    current_year: i32,
) -> Vec<Recommendation> {
    let watched: HashSet<MovieId> = watchlist.iter().map(|m| m.id).collect();
    let watchlist_genres: HashSet<&str> = watchlist
        .iter()
        .flat_map(|m| m.genres.iter().map(String::as_str))
        .collect();

    let mut scored: Vec<(&MovieSummary, f64)> = related
        .iter()
        .filter(|candidate| !watched.contains(&candidate.id))
        .map(|candidate| {
            (
                candidate,
                similarity_score(candidate, &watchlist_genres, current_year),
            )
        })
        .collect();

    sort_descending(&mut scored);

    scored
        .into_iter()
        .take(SIMILARITY_LIMIT)
        .map(|(candidate, score)| Recommendation {
            movie: candidate.clone().with_genre_names(),
            match_score: score.round() as i64,
        })
        .collect()
}

/// Picks the watchlist entry whose related feed seeds the similarity ranking
pub fn pick_seed<'a, R: Rng + ?Sized>(
    rng: &mut R,
    watchlist: &'a [WatchlistMovie],
) -> Option<&'a WatchlistMovie> {
    watchlist.choose(rng)
}

struct CachedRecommendations {
    revision: u64,
    items: Vec<Recommendation>,
}

/// Random source and last good similarity result
pub struct RecommendationEngine {
    rng: StdRng,
    last_good: Option<CachedRecommendations>,
}

impl RecommendationEngine {
    /// A fixed seed makes seed selection reproducible
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            last_good: None,
        }
    }

    fn pick_seed_id(&mut self, watchlist: &[WatchlistMovie]) -> Option<MovieId> {
        pick_seed(&mut self.rng, watchlist).map(|m| m.id)
    }

    /// Stores `items` if they were computed from the current watchlist revision.
    /// Returns false for stale results.
    fn accept(&mut self, computed_at: u64, current: u64, items: &[Recommendation]) -> bool {
        if computed_at != current {
            return false;
        }
        self.last_good = Some(CachedRecommendations {
            revision: computed_at,
            items: items.to_vec(),
        });
        true
    }

    /// Last good result minus anything watchlisted since
    fn fallback(&self, watchlist: &[WatchlistMovie]) -> Vec<Recommendation> {
        let watched: HashSet<MovieId> = watchlist.iter().map(|m| m.id).collect();
        self.last_good
            .as_ref()
            .map(|cached| {
                cached
                    .items
                    .iter()
                    .filter(|r| !watched.contains(&r.movie.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Watchlist revision the cached result was computed from
    pub fn cached_revision(&self) -> Option<u64> {
        self.last_good.as_ref().map(|cached| cached.revision)
    }
}

/// Recomputes similarity recommendations from a randomly chosen watchlist entry.
///
/// No store lock is held while the catalog is queried. When the fetch fails
/// the last good result is served instead (empty if there is none). A result
/// computed from a watchlist that changed in the meantime is returned but
/// not cached.
pub async fn recommend_from_watchlist(
    catalog: &dyn CatalogClient,
    watchlist: &Mutex<WatchlistStore>,
    engine: &Mutex<RecommendationEngine>,
    current_year: i32,
) -> AppResult<Vec<Recommendation>> {
    let (snapshot, revision) = {
        let watchlist = watchlist.lock().await;
        (watchlist.list().to_vec(), watchlist.revision())
    };

    let Some(seed_id) = engine.lock().await.pick_seed_id(&snapshot) else {
        return Ok(Vec::new());
    };

    let related = match catalog.related_movies(seed_id).await {
        Ok(related) => related,
        Err(e) if e.is_remote() => {
            tracing::warn!(seed_id, error = %e, "Related movies fetch failed, serving last good recommendations");
            let current = watchlist.lock().await.list().to_vec();
            return Ok(engine.lock().await.fallback(&current));
        }
        Err(e) => return Err(e),
    };

    let recommendations = rank_by_similarity(&related, &snapshot, current_year);

    let current_revision = watchlist.lock().await.revision();
    if !engine
        .lock()
        .await
        .accept(revision, current_revision, &recommendations)
    {
        tracing::debug!(
            computed_at = revision,
            current = current_revision,
            "Discarding stale recommendations"
        );
    }

    tracing::info!(
        seed_id,
        candidates = related.len(),
        recommended = recommendations.len(),
        "Computed similarity recommendations"
    );

    Ok(recommendations)
}
