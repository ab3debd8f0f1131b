//! Handlers serving the frontend build.

use std::convert::Infallible;
use std::path::Path;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower::ServiceExt;
use tower_http::services::fs::ServeFileSystemResponseBody;
use tower_http::services::{ServeDir, ServeFile};

use crate::api::handlers::banner;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::FrontendConfig;

/// Serves `index.html`, or a JSON 404 when no frontend is deployed.
pub async fn serve_shell(frontend: &FrontendConfig, req: Request) -> Response {
    if !frontend.has_shell() {
        return AppError::not_found("Frontend is not built", json!({})).into_response();
    }

    into_response(ServeFile::new(frontend.index_path()).oneshot(req).await)
}

/// `GET /`: the frontend shell when deployed, otherwise the API banner.
pub async fn index_handler(State(state): State<AppState>, req: Request) -> Response {
    if state.frontend.has_shell() {
        return serve_shell(&state.frontend, req).await;
    }

    banner::banner_handler().await.into_response()
}

/// Catch-all for paths not matched by any route.
///
/// # Resolution Order
///
/// 1. `/api/*`, `/health` and `/qr/*` leftovers → JSON 404
/// 2. Frontend routes and prefixes → shell
/// 3. Paths with a non-HTML file extension → static file or JSON 404
/// 4. Anything else → shell (client-side routing), or JSON 404 without a build
pub async fn frontend_fallback(State(state): State<AppState>, req: Request) -> Response {
    let path = req.uri().path().to_string();

    let owned_elsewhere = ["/api", "/qr"]
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{p}/")))
        || path == "/health";

    if owned_elsewhere {
        return AppError::not_found("Not found", json!({ "path": path })).into_response();
    }

    if state.frontend.is_frontend_route(&path) && !path.starts_with("/assets/") {
        return serve_shell(&state.frontend, req).await;
    }

    if is_asset_path(&path) {
        return serve_asset(&state.frontend, req, &path).await;
    }

    serve_shell(&state.frontend, req).await
}

async fn serve_asset(frontend: &FrontendConfig, req: Request, path: &str) -> Response {
    if frontend.has_shell() {
        let response = into_response(ServeDir::new(frontend.static_dir()).oneshot(req).await);
        if response.status() != StatusCode::NOT_FOUND {
            return response;
        }
    }

    AppError::not_found("Resource not found", json!({ "path": path })).into_response()
}

fn is_asset_path(path: &str) -> bool {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) => !ext.eq_ignore_ascii_case("html"),
        None => false,
    }
}

fn into_response(
    result: Result<axum::http::Response<ServeFileSystemResponseBody>, Infallible>,
) -> Response {
    match result {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_asset_path() {
        assert!(is_asset_path("/favicon.ico"));
        assert!(is_asset_path("/assets/app.3f2a.js"));
        assert!(!is_asset_path("/index.html"));
        assert!(!is_asset_path("/dashboard"));
        assert!(!is_asset_path("/abc123"));
    }
}
