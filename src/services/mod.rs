pub mod catalog;
pub mod collections;
pub mod details;
pub mod ratings;
pub mod recommendations;
pub mod reviews;

pub use catalog::{CatalogClient, TmdbClient};
pub use collections::{FavoritesStore, WatchlistStore};
pub use ratings::RatingAggregator;
pub use recommendations::RecommendationEngine;
pub use reviews::ReviewLog;
