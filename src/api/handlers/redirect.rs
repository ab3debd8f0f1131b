//! Handlers for short URL redirect and click recording.

use axum::{
    Json,
    extract::{ConnectInfo, Path, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::debug;
use url::Url;

use crate::api::dto::link::MessageResponse;
use crate::api::dto::redirect::{ClickRequest, RedirectInfoResponse};
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::code_generator::is_code_charset;
use crate::web::handlers::{frontend_fallback, serve_shell};

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Segments outside the code charset, or owned by the API or the frontend,
///    go to the frontend catch-all
/// 2. Resolve the code (cache first, then database)
/// 3. Enqueue a click event for the background worker without waiting
/// 4. Return 302 Found
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown and no frontend is deployed
/// (with a frontend, its shell is served instead).
/// Returns 410 Gone if the link is disabled or expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
) -> Result<Response, AppError> {
    if !is_code_charset(&code) || state.is_reserved_segment(&code) {
        return Ok(frontend_fallback(State(state), req).await);
    }

    let resolved = match state.link_service.resolve(&code).await {
        Ok(resolved) => resolved,
        Err(AppError::NotFound { .. }) if state.frontend.has_shell() => {
            return Ok(serve_shell(&state.frontend, req).await);
        }
        Err(e) => return Err(e),
    };

    let headers = req.headers();
    let event = ClickEvent::new(
        resolved.link_id,
        Some(client_ip(headers, addr, state.behind_proxy)),
        header_str(headers, header::USER_AGENT),
        header_str(headers, header::REFERER),
    );
    let outcome = state.click_queue.enqueue(event);
    debug!(code = %code, ?outcome, "Redirecting");

    let location = location_header(&resolved.original_url)?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Returns the target of a live link without redirecting.
///
/// # Endpoint
///
/// `GET /api/redirect/{code}`
///
/// # Errors
///
/// Same 404/410 semantics as [`redirect_handler`].
pub async fn redirect_info_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RedirectInfoResponse>, AppError> {
    let resolved = state.link_service.resolve(&code).await?;

    Ok(Json(RedirectInfoResponse {
        original_url: resolved.original_url,
    }))
}

/// Records a click reported by a client that performs the redirect itself.
///
/// # Endpoint
///
/// `POST /api/redirect/{code}/click`
///
/// The optional JSON body may carry `referrer`; otherwise the `Referer` header
/// is used.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn record_click_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Option<Json<ClickRequest>>,
) -> Result<Json<MessageResponse>, AppError> {
    let link = state.link_service.get_by_code(&code).await?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let referrer = body
        .referrer
        .as_deref()
        .or_else(|| header_str(&headers, header::REFERER));

    let event = ClickEvent::new(
        link.id,
        Some(client_ip(&headers, addr, state.behind_proxy)),
        header_str(&headers, header::USER_AGENT),
        referrer,
    );
    state.click_queue.enqueue(event);

    Ok(Json(MessageResponse {
        message: "ok".to_string(),
    }))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Builds the `Location` value. Targets with characters a header cannot carry
/// are sent in their percent-encoded form.
fn location_header(target: &str) -> Result<HeaderValue, AppError> {
    if let Ok(value) = HeaderValue::from_str(target) {
        return Ok(value);
    }

    Url::parse(target)
        .ok()
        .and_then(|u| HeaderValue::from_str(u.as_str()).ok())
        .ok_or_else(|| {
            AppError::internal("Stored URL is not a valid redirect target", json!({}))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_header_plain() {
        let value = location_header("https://example.com/a?b=c").unwrap();
        assert_eq!(value, "https://example.com/a?b=c");
    }

    #[test]
    fn test_location_header_encodes_unicode() {
        let value = location_header("https://example.com/straße").unwrap();
        assert_eq!(value, "https://example.com/stra%C3%9Fe");
    }
}
