//! API route configuration.
//!
//! Public endpoints (banner, redirect info, click recording, link info) are
//! open; everything else requires Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    banner_handler, batch_create_handler, create_link_handler, dashboard_handler,
    delete_link_handler, export_handler, get_link_handler, link_analytics_handler,
    link_info_handler, list_links_handler, record_click_handler, redirect_info_handler,
    toggle_status_handler, update_link_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Endpoints reachable without a token.
///
/// # Endpoints
///
/// - `GET  /`                       - Service banner
/// - `GET  /redirect/{code}`        - Target URL of a live link
/// - `POST /redirect/{code}/click`  - Record a client-side redirect
/// - `GET  /links/info/{code}`      - Public link details
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(banner_handler))
        .route("/redirect/{code}", get(redirect_info_handler))
        .route("/redirect/{code}/click", post(record_click_handler))
        .route("/links/info/{code}", get(link_info_handler))
}

/// Endpoints scoped to the authenticated user.
///
/// # Endpoints
///
/// - `POST   /links/create`                - Create a link
/// - `POST   /links/batch`                 - Create up to 100 links
/// - `GET    /links`                       - List links (paged, sorted, searchable)
/// - `GET    /links/{id}`                  - Link details
/// - `PUT    /links/{id}`                  - Update a link
/// - `DELETE /links/{id}`                  - Delete a link
/// - `POST   /links/{id}/toggle-status`    - Enable/disable a link
/// - `GET    /analytics/dashboard`         - Per-user overview
/// - `GET    /analytics/links/{id}`        - Per-link analytics
/// - `GET    /analytics/export/{id}`       - CSV/JSON click export
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links/create", post(create_link_handler))
        .route("/links/batch", post(batch_create_handler))
        .route("/links", get(list_links_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{id}/toggle-status", post(toggle_status_handler))
        .route("/analytics/dashboard", get(dashboard_handler))
        .route("/analytics/links/{id}", get(link_analytics_handler))
        .route("/analytics/export/{id}", get(export_handler))
}

/// The full `/api` router: protected routes behind the auth middleware,
/// merged with the public ones.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected =
        protected_routes().route_layer(middleware::from_fn_with_state(state, auth::layer));

    Router::new().merge(public_routes()).merge(protected)
}
