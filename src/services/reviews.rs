use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    db::{self, KeyValueStore, StoreKey},
    error::{AppError, AppResult},
    models::{MovieId, Review, Session},
};

/// Append-only review lists, one per movie
pub struct ReviewLog {
    store: Arc<dyn KeyValueStore>,
    reviews: HashMap<MovieId, Vec<Review>>,
}

impl ReviewLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            reviews: HashMap::new(),
        }
    }

    async fn reviews_mut(&mut self, movie_id: MovieId) -> &mut Vec<Review> {
        if !self.reviews.contains_key(&movie_id) {
            let loaded: Vec<Review> =
                db::load_or_default(self.store.as_ref(), &StoreKey::MovieReviews(movie_id)).await;
            tracing::debug!(movie_id, count = loaded.len(), "Hydrated review log");
            self.reviews.insert(movie_id, loaded);
        }
        self.reviews.entry(movie_id).or_default()
    }

    /// Reviews oldest first; empty when none exist
    pub async fn list_reviews(&mut self, movie_id: MovieId) -> Vec<Review> {
        self.reviews_mut(movie_id).await.clone()
    }

    /// Appends a review by the session user, stamped with the current time
    pub async fn add_review(
        &mut self,
        movie_id: MovieId,
        session: &Session,
        content: &str,
    ) -> AppResult<Review> {
        self.add_review_at(movie_id, session, content, Utc::now()).await
    }

    pub(crate) async fn add_review_at(
        &mut self,
        movie_id: MovieId,
        session: &Session,
        content: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Review> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Review content cannot be empty".to_string(),
            ));
        }

        let store = self.store.clone();
        let reviews = self.reviews_mut(movie_id).await;

        let review = Review {
            id: next_review_id(reviews, now),
            user_id: session.user_id.clone(),
            username: session.username.clone(),
            content: content.to_string(),
            timestamp: now.to_rfc3339(),
        };

        let mut next = reviews.clone();
        next.push(review.clone());
        db::save(store.as_ref(), &StoreKey::MovieReviews(movie_id), &next).await?;
        *reviews = next;

        tracing::info!(movie_id, review_id = %review.id, count = reviews.len(), "Appended review");
        Ok(review)
    }
}

/// Millisecond timestamp, bumped past the newest numeric id already in the log
fn next_review_id(existing: &[Review], now: DateTime<Utc>) -> String {
    let candidate = now.timestamp_millis();
    let newest = existing
        .iter()
        .filter_map(|r| r.id.parse::<i64>().ok())
        .max();

    match newest {
        Some(newest) if newest >= candidate => (newest + 1).to_string(),
        _ => candidate.to_string(),
    }
}
