#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tinylink::application::services::auth_service::hash_token;
use tinylink::domain::click_event::ClickEvent;
use tinylink::domain::click_queue::ClickQueue;
use tinylink::domain::click_worker::process_click;
use tinylink::domain::entities::{Link, LinkPatch, NewLink};
use tinylink::domain::repositories::{LinkRepository, TokenRepository, UserRepository};
use tinylink::infrastructure::cache::NullCache;
use tinylink::infrastructure::persistence::{
    SqliteClickRepository, SqliteLinkRepository, SqliteTokenRepository, SqliteUserRepository,
};
use tinylink::state::{AppState, StateOptions};
use tinylink::web::FrontendConfig;
use tokio::sync::mpsc;
use tower::Layer;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "http://sho.rt";

pub async fn create_user(pool: &SqlitePool, email: &str) -> i64 {
    SqliteUserRepository::new(Arc::new(pool.clone()))
        .create(email, None)
        .await
        .unwrap()
        .id
}

/// Issues a token for `user_id` and returns the raw bearer value.
pub async fn create_token(pool: &SqlitePool, user_id: i64, raw: &str) -> String {
    SqliteTokenRepository::new(Arc::new(pool.clone()))
        .create_token(user_id, raw, &hash_token(SIGNING_SECRET, raw))
        .await
        .unwrap();
    raw.to_string()
}

pub async fn create_link(pool: &SqlitePool, user_id: i64, code: &str, url: &str) -> Link {
    create_link_expiring(pool, user_id, code, url, None).await
}

pub async fn create_link_expiring(
    pool: &SqlitePool,
    user_id: i64,
    code: &str,
    url: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Link {
    SqliteLinkRepository::new(Arc::new(pool.clone()))
        .create(NewLink {
            user_id,
            short_code: code.to_string(),
            original_url: url.to_string(),
            title: None,
            description: None,
            tags: None,
            expires_at,
        })
        .await
        .unwrap()
}

pub async fn create_expired_link(pool: &SqlitePool, user_id: i64, code: &str, url: &str) -> Link {
    create_link_expiring(pool, user_id, code, url, Some(Utc::now() - Duration::seconds(1))).await
}

pub async fn create_disabled_link(pool: &SqlitePool, user_id: i64, code: &str, url: &str) -> Link {
    let link = create_link(pool, user_id, code, url).await;
    SqliteLinkRepository::new(Arc::new(pool.clone()))
        .update(
            link.id,
            user_id,
            LinkPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

pub async fn click_count(pool: &SqlitePool, link_id: i64) -> i64 {
    sqlx::query_scalar("SELECT click_count FROM short_links WHERE id = ?")
        .bind(link_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn click_log_count(pool: &SqlitePool, link_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM click_logs WHERE link_id = ?")
        .bind(link_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Runs every queued click through the worker's persistence step.
pub async fn drain_clicks(pool: &SqlitePool, rx: &mut mpsc::Receiver<ClickEvent>) -> usize {
    let pool = Arc::new(pool.clone());
    let clicks = SqliteClickRepository::new(pool.clone());
    let links = SqliteLinkRepository::new(pool);

    let mut processed = 0;
    while let Ok(event) = rx.try_recv() {
        process_click(event, &clicks, &links).await;
        processed += 1;
    }
    processed
}

pub fn create_test_state(pool: SqlitePool) -> (AppState, mpsc::Receiver<ClickEvent>) {
    create_test_state_with_queue(pool, 100)
}

pub fn create_test_state_with_queue(
    pool: SqlitePool,
    capacity: usize,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (click_queue, rx) = ClickQueue::bounded(capacity);

    let options = StateOptions {
        base_url: BASE_URL.to_string(),
        token_signing_secret: SIGNING_SECRET.to_string(),
        cache_ttl_seconds: 60,
        behind_proxy: false,
        frontend: FrontendConfig::new(
            "target/no-frontend-build",
            vec!["/dashboard".to_string(), "/login".to_string()],
            vec!["/assets/".to_string()],
        ),
    };

    let state = AppState::new(Arc::new(pool), Arc::new(NullCache::new()), click_queue, options);

    (state, rx)
}

/// Full router (API, redirector, fallback) with a fixed peer address.
pub fn test_server(state: AppState) -> TestServer {
    let app: Router = tinylink::routes::routes(state, false).layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
