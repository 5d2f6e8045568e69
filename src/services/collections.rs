use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::{self, KeyValueStore, StoreKey},
    error::AppResult,
    models::{Actor, Keyed, WatchlistMovie},
};

/// Id-unique, insertion-ordered collection mirrored to one store key
///
/// Every effective mutation writes the full sequence under the collection's
/// key first; memory changes only once that write succeeds.
pub struct CollectionStore<T> {
    key: StoreKey,
    store: Arc<dyn KeyValueStore>,
    items: Vec<T>,
    revision: u64,
}

/// Favorited actors, persisted under `favoriteActors`
pub type FavoritesStore = CollectionStore<Actor>;

/// Watchlisted movies, persisted under `watchlist`
pub type WatchlistStore = CollectionStore<WatchlistMovie>;

impl<T> CollectionStore<T>
where
    T: Keyed + Clone + Serialize + DeserializeOwned,
{
    /// Loads the collection once from the durable store.
    ///
    /// Absent or corrupt records hydrate as an empty collection. Duplicate
    /// ids in a persisted record keep their first occurrence.
    pub async fn hydrate(store: Arc<dyn KeyValueStore>, key: StoreKey) -> Self {
        let loaded: Vec<T> = db::load_or_default(store.as_ref(), &key).await;

        let mut seen = HashSet::new();
        let items: Vec<T> = loaded
            .into_iter()
            .filter(|item| seen.insert(item.key()))
            .collect();

        tracing::info!(key = %key, count = items.len(), "Hydrated collection");

        Self {
            key,
            store,
            items,
            revision: 0,
        }
    }

    /// Items in insertion order
    pub fn list(&self) -> &[T] {
        &self.items
    }

    pub fn contains(&self, id: u64) -> bool {
        self.items.iter().any(|item| item.key() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Counter bumped on every effective mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Appends `item` unless an item with the same id is present.
    /// Returns whether the collection changed.
    pub async fn add(&mut self, item: T) -> AppResult<bool> {
        let id = item.key();
        if self.contains(id) {
            tracing::debug!(key = %self.key, id, "Item already present");
            return Ok(false);
        }

        let mut next = self.items.clone();
        next.push(item);
        self.commit(next).await?;
        tracing::info!(key = %self.key, id, count = self.items.len(), "Added item");
        Ok(true)
    }

    /// Removes the item with `id` if present. Returns whether the collection changed.
    pub async fn remove(&mut self, id: u64) -> AppResult<bool> {
        if !self.contains(id) {
            return Ok(false);
        }

        let next: Vec<T> = self
            .items
            .iter()
            .filter(|item| item.key() != id)
            .cloned()
            .collect();
        self.commit(next).await?;
        tracing::info!(key = %self.key, id, count = self.items.len(), "Removed item");
        Ok(true)
    }

    /// Persists `next` and only then replaces the in-memory sequence
    async fn commit(&mut self, next: Vec<T>) -> AppResult<()> {
        db::save(self.store.as_ref(), &self.key, &next).await?;
        self.items = next;
        self.revision += 1;
        Ok(())
    }
}

impl FavoritesStore {
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        Self::hydrate(store, StoreKey::FavoriteActors).await
    }
}

impl WatchlistStore {
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        Self::hydrate(store, StoreKey::Watchlist).await
    }
}
