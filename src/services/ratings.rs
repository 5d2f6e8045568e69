//! Blends the remote aggregate rating of a movie with local user ratings.
//!
//! User ratings are collected on a 1–5 scale while the remote aggregate is on
//! TMDB's 0–10 scale. The two are blended as-is, without rescaling, so stored
//! values and displayed numbers stay compatible with existing records.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::{
    db::{self, KeyValueStore, StoreKey},
    error::{AppError, AppResult},
    models::{MovieId, RatingRecord, RatingSummary, RemoteAggregate, Session},
};

pub const MIN_STARS: i64 = 1;
pub const MAX_STARS: i64 = 5;

/// Vote-count-weighted mean of the remote aggregate and the user ratings.
///
/// The remote aggregate counts as `api_vote_count` votes at `api_rating`;
/// each user rating counts as one more vote at its face value. With no
/// user ratings the result is `api_rating` itself.
pub fn blended_rating(
    user_ratings: &BTreeMap<String, i64>,
    api_rating: f64,
    api_vote_count: u64,
) -> f64 {
    if user_ratings.is_empty() {
        return api_rating;
    }

    let user_sum: i64 = user_ratings.values().sum();
    let weighted_sum = api_vote_count as f64 * api_rating + user_sum as f64;
    let weighted_count = api_vote_count + user_ratings.len() as u64;

    if weighted_count > 0 {
        weighted_sum / weighted_count as f64
    } else {
        api_rating
    }
}

/// Star buckets 1..=5: one count per local rating plus a synthetic spread
/// of `floor(api_vote_count / 5 * star)` per bucket, since the remote API
/// exposes no histogram.
pub fn rating_distribution(
    user_ratings: &BTreeMap<String, i64>,
    api_vote_count: u64,
) -> BTreeMap<u8, u64> {
    let mut buckets: BTreeMap<u8, u64> = (1..=5).map(|star| (star, 0)).collect();

    for rating in user_ratings.values() {
        if (MIN_STARS..=MAX_STARS).contains(rating) {
            *buckets.entry(*rating as u8).or_insert(0) += 1;
        }
    }

    for star in 1..=5u8 {
        let synthetic = (api_vote_count as f64 / 5.0 * f64::from(star)).floor() as u64;
        *buckets.entry(star).or_insert(0) += synthetic;
    }

    buckets
}

/// Rejects anything but a whole number of stars in 1..=5
pub fn validate_stars(rating: f64) -> AppResult<i64> {
    if rating.fract() != 0.0 || !(MIN_STARS as f64..=MAX_STARS as f64).contains(&rating) {
        return Err(AppError::Validation(format!(
            "Rating must be a whole number from {} to {}, got {}",
            MIN_STARS, MAX_STARS, rating
        )));
    }
    Ok(rating as i64)
}

/// Summary of a record as seen by `user_id`
pub fn summarize(record: &RatingRecord, user_id: &str) -> RatingSummary {
    let api_vote_count = record.api_vote_count();
    RatingSummary {
        blended_rating: blended_rating(&record.user_ratings, record.api_rating(), api_vote_count),
        total_ratings: record.user_ratings.len() as u64 + api_vote_count,
        distribution: rating_distribution(&record.user_ratings, api_vote_count),
        user_rating: record.user_ratings.get(user_id).copied(),
    }
}

/// Per-movie rating records, hydrated from the store on first access
pub struct RatingAggregator {
    store: Arc<dyn KeyValueStore>,
    records: HashMap<MovieId, RatingRecord>,
}

impl RatingAggregator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            records: HashMap::new(),
        }
    }

    async fn record_mut(&mut self, movie_id: MovieId) -> &mut RatingRecord {
        if !self.records.contains_key(&movie_id) {
            let record: RatingRecord =
                db::load_or_default(self.store.as_ref(), &StoreKey::MovieRatings(movie_id)).await;
            tracing::debug!(
                movie_id,
                user_ratings = record.user_ratings.len(),
                "Hydrated rating record"
            );
            self.records.insert(movie_id, record);
        }
        self.records.entry(movie_id).or_default()
    }

    /// Combines freshly fetched remote data with the stored record.
    ///
    /// The first remote aggregate seen for a movie becomes its snapshot;
    /// later fetches never replace it. A failed snapshot write is logged and
    /// the summary is still returned.
    pub async fn load(
        &mut self,
        movie_id: MovieId,
        remote: RemoteAggregate,
        session: &Session,
    ) -> RatingSummary {
        let store = self.store.clone();
        let record = self.record_mut(movie_id).await;

        if record.snapshot(&remote) {
            tracing::info!(
                movie_id,
                api_rating = remote.vote_average,
                api_vote_count = remote.vote_count,
                "Captured remote rating snapshot"
            );
            if let Err(e) = db::save(store.as_ref(), &StoreKey::MovieRatings(movie_id), &*record).await {
                tracing::warn!(movie_id, error = %e, "Rating snapshot not persisted");
            }
        }

        summarize(record, &session.user_id)
    }

    /// Current summary without contacting the remote catalog
    pub async fn summary(&mut self, movie_id: MovieId, session: &Session) -> RatingSummary {
        let record = self.record_mut(movie_id).await;
        summarize(record, &session.user_id)
    }

    /// Upserts the session user's rating and persists the record.
    ///
    /// Out-of-range ratings and failed writes leave the record untouched.
    pub async fn record_user_rating(
        &mut self,
        movie_id: MovieId,
        session: &Session,
        rating: i64,
    ) -> AppResult<RatingSummary> {
        if !(MIN_STARS..=MAX_STARS).contains(&rating) {
            tracing::warn!(movie_id, rating, "Rejected out-of-range rating");
            return Err(AppError::Validation(format!(
                "Rating must be between {} and {}, got {}",
                MIN_STARS, MAX_STARS, rating
            )));
        }

        let store = self.store.clone();
        let record = self.record_mut(movie_id).await;

        let mut next = record.clone();
        next.user_ratings.insert(session.user_id.clone(), rating);
        db::save(store.as_ref(), &StoreKey::MovieRatings(movie_id), &next).await?;
        *record = next;

        tracing::info!(movie_id, user_id = %session.user_id, rating, "Recorded user rating");
        Ok(summarize(record, &session.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn ratings(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
        pairs.iter().map(|(u, r)| (u.to_string(), *r)).collect()
    }

    fn session() -> Session {
        Session::new("user1", "Movie Fan")
    }

    #[test]
    fn test_blended_without_user_ratings_is_api_rating() {
        for (api_rating, count) in [(0.1, 3), (7.3, 100), (6.45, 0), (9.99, 12_345)] {
            assert_eq!(blended_rating(&BTreeMap::new(), api_rating, count), api_rating);
        }
    }

    #[test]
    fn test_blended_single_user_rating() {
        let blended = blended_rating(&ratings(&[("user1", 5)]), 7.0, 100);
        assert!((blended - 705.0 / 101.0).abs() < 1e-12);
        assert!((blended - 6.9802).abs() < 1e-4);
    }

    #[test]
    fn test_blended_with_no_api_votes() {
        let blended = blended_rating(&ratings(&[("a", 4), ("b", 2)]), 8.0, 0);
        assert_eq!(blended, 3.0);
    }

    #[test]
    fn test_distribution_exact_formula() {
        let distribution = rating_distribution(&ratings(&[("a", 5), ("b", 5), ("c", 1)]), 12);

        // floor(12 / 5 * i) = 2, 4, 7, 9, 12
        assert_eq!(distribution[&1], 2 + 1);
        assert_eq!(distribution[&2], 4);
        assert_eq!(distribution[&3], 7);
        assert_eq!(distribution[&4], 9);
        assert_eq!(distribution[&5], 12 + 2);
    }

    #[test]
    fn test_distribution_empty_inputs() {
        let distribution = rating_distribution(&BTreeMap::new(), 0);
        assert_eq!(distribution.len(), 5);
        assert!(distribution.values().all(|count| *count == 0));
    }

    #[test]
    fn test_summary_total_counts_every_vote_once() {
        let mut record = RatingRecord {
            user_ratings: ratings(&[("user1", 3), ("user2", 4)]),
            ..Default::default()
        };
        record.snapshot(&RemoteAggregate {
            vote_average: 6.0,
            vote_count: 250,
        });

        let summary = summarize(&record, "user2");
        assert_eq!(summary.total_ratings, 252);
        assert_eq!(summary.user_rating, Some(4));
    }

    #[test]
    fn test_validate_stars() {
        assert_eq!(validate_stars(1.0).unwrap(), 1);
        assert_eq!(validate_stars(5.0).unwrap(), 5);
        assert!(validate_stars(0.0).is_err());
        assert!(validate_stars(6.0).is_err());
        assert!(validate_stars(3.5).is_err());
        assert!(validate_stars(f64::NAN).is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_rating_leaves_record_unchanged() {
        let backend = Arc::new(MemoryStore::new());
        let mut aggregator = RatingAggregator::new(backend.clone());
        aggregator
            .record_user_rating(42, &session(), 3)
            .await
            .unwrap();
        let before = backend.get(&StoreKey::MovieRatings(42)).await.unwrap();

        let result = aggregator.record_user_rating(42, &session(), 6).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        let after = backend.get(&StoreKey::MovieRatings(42)).await.unwrap();
        assert_eq!(before, after);
        assert_eq!(aggregator.summary(42, &session()).await.user_rating, Some(3));
    }

    #[tokio::test]
    async fn test_rejected_rating_on_fresh_movie_persists_nothing() {
        let backend = Arc::new(MemoryStore::new());
        let mut aggregator = RatingAggregator::new(backend.clone());

        assert!(aggregator.record_user_rating(42, &session(), 6).await.is_err());
        assert_eq!(backend.get(&StoreKey::MovieRatings(42)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_snapshot_is_never_overwritten() {
        let backend = Arc::new(MemoryStore::new());
        let mut aggregator = RatingAggregator::new(backend.clone());
        let first = RemoteAggregate {
            vote_average: 7.0,
            vote_count: 100,
        };
        let refreshed = RemoteAggregate {
            vote_average: 8.5,
            vote_count: 4000,
        };

        aggregator.load(42, first, &session()).await;
        let summary = aggregator.record_user_rating(42, &session(), 5).await.unwrap();
        assert!((summary.blended_rating - 705.0 / 101.0).abs() < 1e-12);

        let summary = aggregator.load(42, refreshed, &session()).await;
        assert_eq!(summary.total_ratings, 101);

        let persisted: RatingRecord =
            db::load_or_default(backend.as_ref(), &StoreKey::MovieRatings(42)).await;
        assert_eq!(persisted.api_vote_count, Some(100));
        assert_eq!(persisted.api_rating, Some(7.0));
        assert_eq!(persisted.user_ratings.get("user1"), Some(&5));
    }

    #[tokio::test]
    async fn test_rating_upserts_per_user() {
        let backend = Arc::new(MemoryStore::new());
        let mut aggregator = RatingAggregator::new(backend);
        let other = Session::new("user2", "Critic");

        aggregator.record_user_rating(9, &session(), 2).await.unwrap();
        aggregator.record_user_rating(9, &session(), 4).await.unwrap();
        let summary = aggregator.record_user_rating(9, &other, 1).await.unwrap();

        assert_eq!(summary.total_ratings, 2);
        assert_eq!(summary.user_rating, Some(1));
        assert_eq!(summary.distribution[&4], 1);
        assert_eq!(summary.distribution[&2], 0);
    }

    #[tokio::test]
    async fn test_ratings_survive_new_aggregator() {
        let backend = Arc::new(MemoryStore::new());
        let mut aggregator = RatingAggregator::new(backend.clone());
        aggregator.record_user_rating(11, &session(), 4).await.unwrap();

        let mut restarted = RatingAggregator::new(backend);
        assert_eq!(restarted.summary(11, &session()).await.user_rating, Some(4));
    }

    /// Backend whose writes always fail
    struct FailingStore;

    #[async_trait::async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &StoreKey) -> AppResult<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &StoreKey, _value: String) -> AppResult<()> {
            Err(AppError::Internal("disk full".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_rating_unrecorded() {
        let mut aggregator = RatingAggregator::new(Arc::new(FailingStore));

        for _ in 0..2 {
            let result = aggregator.record_user_rating(42, &session(), 4).await;
            assert!(matches!(result, Err(AppError::Internal(_))));
        }

        let summary = aggregator.summary(42, &session()).await;
        assert_eq!(summary.user_rating, None);
        assert_eq!(summary.total_ratings, 0);
    }
}
