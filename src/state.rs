use std::sync::Arc;

use crate::application::services::{RedirectService, SyncService, TrendingService, UrlService};
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::{CacheService, CounterStore, RateLimitStore};

/// Rate-limit policy applied to `/api` routes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_requests: u64,
    pub window_seconds: u64,
    /// Trust X-Forwarded-For / X-Real-IP for the caller key.
    pub behind_proxy: bool,
}

/// Shared application state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub url_service: Arc<UrlService>,
    pub trending_service: Arc<TrendingService>,
    pub sync_service: Arc<SyncService>,
    pub cache: Arc<dyn CacheService>,
    pub rate_limits: Arc<dyn RateLimitStore>,
    pub rate_limit: RateLimitPolicy,
}

impl AppState {
    /// Wires the services over one repository and one cache backend.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        counters: Arc<dyn CounterStore>,
        rate_limits: Arc<dyn RateLimitStore>,
        rate_limit: RateLimitPolicy,
        trending_limit: usize,
    ) -> Self {
        let redirect_service = Arc::new(RedirectService::new(
            repository.clone(),
            cache.clone(),
            counters.clone(),
        ));
        let url_service = Arc::new(UrlService::new(
            repository.clone(),
            cache.clone(),
            counters.clone(),
        ));
        let trending_service = Arc::new(TrendingService::new(
            repository.clone(),
            counters.clone(),
            trending_limit,
        ));
        let sync_service = Arc::new(SyncService::new(repository, counters));

        Self {
            redirect_service,
            url_service,
            trending_service,
            sync_service,
            cache,
            rate_limits,
            rate_limit,
        }
    }
}
