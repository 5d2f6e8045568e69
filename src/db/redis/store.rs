use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;

use crate::db::{KeyValueStore, StoreKey};
use crate::error::AppResult;

/// Creates a Redis client for the durable store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Durable backend over Redis strings
///
/// Writes are plain `SET` without expiry and are awaited before returning,
/// so a mutation is persisted by the time the caller sees it succeed.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects through a connection manager that reconnects on failure
    pub async fn connect(client: Client) -> AppResult<Self> {
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis store");
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &StoreKey) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key.to_string()).await.map_err(|e| {
            tracing::warn!(key = %key, error = %e, "Redis get failed");
            e
        })?;
        Ok(value)
    }

    async fn set(&self, key: &StoreKey, value: String) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key.to_string(), value).await?;
        tracing::debug!(key = %key, "Persisted record to Redis");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

// Needs a live server: REDIS_URL or redis://localhost:6379
#[cfg(test)]
mod tests {
    use super::*;

    async fn connect() -> RedisStore {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = create_redis_client(&redis_url).unwrap();
        RedisStore::connect(client).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_missing_key_is_none() {
        let store = connect().await;
        let value = store.get(&StoreKey::MovieReviews(987_654_321)).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_set_then_get() {
        let store = connect().await;
        let key = StoreKey::MovieRatings(123_456_789);

        store.set(&key, r#"{"userRatings":{}}"#.to_string()).await.unwrap();
        let value = store.get(&key).await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"userRatings":{}}"#));

        let mut conn = store.conn.clone();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
