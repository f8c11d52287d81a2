pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{RecError, Result};
pub use models::*;

use services::cache::RecommendationCache;
use services::recommendation::RecommendationService;
use std::sync::Arc;
use store::{ingest, StoreHandle};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<StoreHandle>,
    pub recommendation_service: Arc<RecommendationService>,
    pub cache: Arc<RecommendationCache>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = ingest::load(&config.source).await?;
        info!(
            users = store.user_count(),
            items = store.item_count(),
            ratings = store.rating_count(),
            "preference store loaded"
        );

        Ok(Self {
            config,
            store: Arc::new(StoreHandle::new(store)),
            recommendation_service: Arc::new(RecommendationService::with_defaults()),
            cache: Arc::new(RecommendationCache::new()),
        })
    }

    /// Rebuilds the store from the configured source and atomically
    /// publishes it. On failure the previous snapshot keeps serving and the
    /// cache is left untouched.
    pub async fn reload(&self) -> Result<u64> {
        let store = ingest::load(&self.config.source).await?;
        let version = self.store.replace(store);
        self.cache.invalidate_all();
        info!(version, "preference store reloaded");
        Ok(version)
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
