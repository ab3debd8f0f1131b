//! Shared application state injected into every handler.

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::application::services::{AnalyticsService, AuthService, LinkService};
use crate::config::Config;
use crate::domain::click_queue::ClickQueue;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{
    SqliteClickRepository, SqliteLinkRepository, SqliteTokenRepository,
};
use crate::utils::code_generator::RESERVED_CODES;
use crate::web::FrontendConfig;

/// Settings the state needs beyond its connections.
#[derive(Debug, Clone)]
pub struct StateOptions {
    pub base_url: String,
    pub token_signing_secret: String,
    pub cache_ttl_seconds: u64,
    pub behind_proxy: bool,
    pub frontend: FrontendConfig,
}

impl StateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            token_signing_secret: config.token_signing_secret.clone(),
            cache_ttl_seconds: config.cache_ttl_seconds,
            behind_proxy: config.behind_proxy,
            frontend: FrontendConfig::from_config(config),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub link_service: Arc<LinkService<SqliteLinkRepository>>,
    pub analytics_service: Arc<AnalyticsService<SqliteLinkRepository, SqliteClickRepository>>,
    pub auth_service: Arc<AuthService<SqliteTokenRepository>>,
    pub cache: Arc<dyn CacheService>,
    pub click_queue: ClickQueue,
    pub frontend: Arc<FrontendConfig>,
    /// Read client IPs from forwarding headers.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires repositories and services over one pool.
    pub fn new(
        db: Arc<SqlitePool>,
        cache: Arc<dyn CacheService>,
        click_queue: ClickQueue,
        options: StateOptions,
    ) -> Self {
        let link_repository = Arc::new(SqliteLinkRepository::new(db.clone()));
        let click_repository = Arc::new(SqliteClickRepository::new(db.clone()));
        let token_repository = Arc::new(SqliteTokenRepository::new(db.clone()));

        let link_service = LinkService::new(
            link_repository.clone(),
            cache.clone(),
            options.base_url,
            options.frontend.reserved_segments(),
        )
        .with_cache_ttl(options.cache_ttl_seconds);

        Self {
            db,
            link_service: Arc::new(link_service),
            analytics_service: Arc::new(AnalyticsService::new(link_repository, click_repository)),
            auth_service: Arc::new(AuthService::new(
                token_repository,
                options.token_signing_secret,
            )),
            cache,
            click_queue,
            frontend: Arc::new(options.frontend),
            behind_proxy: options.behind_proxy,
        }
    }

    /// True when `segment` can never be a short code because another part of
    /// the app owns it.
    pub fn is_reserved_segment(&self, segment: &str) -> bool {
        RESERVED_CODES
            .iter()
            .any(|r| r.eq_ignore_ascii_case(segment))
            || self
                .frontend
                .is_frontend_route(&format!("/{segment}"))
    }
}
