use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinemate_api::{
    config::{Config, StorageBackend},
    db::{create_redis_client, FileStore, KeyValueStore, RedisStore},
    routes::{create_router, AppState, StateSettings},
    services::TmdbClient,
};

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.storage_backend {
        StorageBackend::File => Arc::new(
            FileStore::open(&config.data_path)
                .await
                .with_context(|| format!("Failed to open data file {}", config.data_path))?,
        ),
        StorageBackend::Redis => {
            let client = create_redis_client(&config.redis_url)?;
            Arc::new(
                RedisStore::connect(client)
                    .await
                    .context("Failed to connect to Redis")?,
            )
        }
    };
    Ok(store)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinemate_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store = open_store(&config).await?;
    let catalog = Arc::new(TmdbClient::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let state = AppState::new(store, catalog, StateSettings::from(&config)).await;
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
