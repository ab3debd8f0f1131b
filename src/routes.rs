//! Top-level router combining the redirector, the API and the frontend.
//!
//! # Route Structure
//!
//! - `GET  /`            - Frontend shell, or the API banner without a frontend
//! - `GET  /{code}`      - Short link redirect (public)
//! - `GET  /health`      - Health check: DB, click queue, cache (public)
//! - `/api/*`            - REST API (Bearer token for owner-scoped routes)
//! - `/qr/*`             - Reserved, answers 404
//! - anything else       - Frontend assets and SPA fallback
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api` (proxy-aware when configured)
//! - **CORS** - Allowed origins from `CORS_ORIGINS`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::error::AppError;
use crate::state::AppState;
use crate::web::handlers::{frontend_fallback, index_handler};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use serde_json::json;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes without the outer layers, for composition and tests.
pub fn routes(state: AppState, behind_proxy: bool) -> Router {
    let api_router = rate_limit::apply(api::routes::api_routes(state.clone()), behind_proxy);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/qr/{*rest}", get(qr_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api_router)
        .fallback(frontend_fallback)
        .with_state(state)
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `cors_origins` - origins allowed to call the API from a browser
pub fn app_router(state: AppState, cors_origins: &[String]) -> NormalizePath<Router> {
    let behind_proxy = state.behind_proxy;

    let router = routes(state, behind_proxy)
        .layer(cors_layer(cors_origins))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn qr_handler() -> AppError {
    AppError::not_found("QR codes are not available", json!({}))
}
