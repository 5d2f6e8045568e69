use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::Config,
    db::KeyValueStore,
    models::Session,
    services::{
        CatalogClient, FavoritesStore, RatingAggregator, RecommendationEngine, ReviewLog,
        WatchlistStore,
    },
};

/// Per-deployment settings the handlers need
#[derive(Debug, Clone)]
pub struct StateSettings {
    /// Base URL poster paths are joined onto
    pub image_base: String,
    /// Identity applied when a request carries none
    pub default_session: Session,
    pub recommendation_seed: Option<u64>,
}

impl From<&Config> for StateSettings {
    fn from(config: &Config) -> Self {
        Self {
            image_base: config.tmdb_image_url.clone(),
            default_session: Session::new(
                config.default_user_id.clone(),
                config.default_username.clone(),
            ),
            recommendation_seed: config.recommendation_seed,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

/// One lock per store
pub struct AppStateInner {
    pub catalog: Arc<dyn CatalogClient>,
    pub favorites: Mutex<FavoritesStore>,
    pub watchlist: Mutex<WatchlistStore>,
    pub ratings: Mutex<RatingAggregator>,
    pub reviews: Mutex<ReviewLog>,
    pub recommendations: Mutex<RecommendationEngine>,
    pub image_base: String,
    pub default_session: Session,
}

impl AppState {
    /// Hydrates the collections from `store` and wires up the services
    pub async fn new(
        store: Arc<dyn KeyValueStore>,
        catalog: Arc<dyn CatalogClient>,
        settings: StateSettings,
    ) -> Self {
        let favorites = FavoritesStore::open(store.clone()).await;
        let watchlist = WatchlistStore::open(store.clone()).await;

        tracing::info!(
            store = store.name(),
            catalog = catalog.name(),
            favorites = favorites.len(),
            watchlist = watchlist.len(),
            "Application state ready"
        );

        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                favorites: Mutex::new(favorites),
                watchlist: Mutex::new(watchlist),
                ratings: Mutex::new(RatingAggregator::new(store.clone())),
                reviews: Mutex::new(ReviewLog::new(store)),
                recommendations: Mutex::new(RecommendationEngine::new(
                    settings.recommendation_seed,
                )),
                image_base: settings.image_base,
                default_session: settings.default_session,
            }),
        }
    }
}
