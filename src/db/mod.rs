use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::models::MovieId;

pub mod file;
pub mod redis;

pub use self::file::FileStore;
pub use self::redis::{create_redis_client, RedisStore};

/// Logical keys of the persisted local state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    FavoriteActors,
    Watchlist,
    MovieRatings(MovieId),
    MovieReviews(MovieId),
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::FavoriteActors => write!(f, "favoriteActors"),
            StoreKey::Watchlist => write!(f, "watchlist"),
            StoreKey::MovieRatings(id) => write!(f, "movieRatings_{}", id),
            StoreKey::MovieReviews(id) => write!(f, "movieReviews_{}", id),
        }
    }
}

/// Durable map from string keys to JSON text
///
/// Backends only move opaque strings; typed access goes through
/// [`load_or_default`] and [`save`].
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &StoreKey) -> AppResult<Option<String>>;

    async fn set(&self, key: &StoreKey, value: String) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Reads and decodes a persisted value.
///
/// Never fails: an absent key yields the default, and a read failure or
/// malformed record is logged and also yields the default.
pub async fn load_or_default<T>(store: &dyn KeyValueStore, key: &StoreKey) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key = %key, backend = store.name(), error = %e, "Store read failed, using empty value");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Discarding corrupt persisted record");
            T::default()
        }
    }
}

/// Serializes the whole value and writes it under `key`
pub async fn save<T: Serialize>(store: &dyn KeyValueStore, key: &StoreKey, value: &T) -> AppResult<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, json).await.map_err(|e| {
        tracing::error!(key = %key, backend = store.name(), error = %e, "Store write failed");
        e
    })
}

/// Process-local backend, used by tests and throwaway runs
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing serialization
    pub async fn insert_raw(&self, key: &StoreKey, raw: impl Into<String>) {
        self.entries.write().await.insert(key.to_string(), raw.into());
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &StoreKey) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(&key.to_string()).cloned())
    }

    async fn set(&self, key: &StoreKey, value: String) -> AppResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
