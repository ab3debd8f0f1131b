//! Handlers for link management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::{
    BatchCreateRequest, BatchCreateResponse, CreateLinkRequest, LinkListResponse, LinkResponse,
    MessageResponse, UpdateLinkRequest,
};
use crate::api::dto::pagination::{ListParams, PaginationMeta};
use crate::domain::entities::{AuthUser, Link};
use crate::error::AppError;
use crate::state::AppState;

fn to_response(state: &AppState, link: Link) -> LinkResponse {
    let short_url = state.link_service.short_url(&link.short_code);
    LinkResponse::new(link, short_url)
}

/// Creates a short link owned by the caller.
///
/// # Endpoint
///
/// `POST /api/links/create`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/some/long/path",
///   "short_code": "promo1",
///   "title": "Spring promo",
///   "expires_at": "2026-12-31T23:59:59Z"
/// }
/// ```
///
/// Only `original_url` is required. Without `short_code` a random 6-character
/// code is generated.
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails or the code is reserved.
/// Returns 409 Conflict if the custom code is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(user.user_id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, link))))
}

/// Creates one link per URL. Failures are reported per URL and do not abort
/// the batch.
///
/// # Endpoint
///
/// `POST /api/links/batch`
pub async fn batch_create_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<BatchCreateRequest>,
) -> Result<Json<BatchCreateResponse>, AppError> {
    payload.validate()?;

    let outcome = state
        .link_service
        .batch_create(user.user_id, payload.urls)
        .await?;

    Ok(Json(BatchCreateResponse::new(outcome, |code| {
        state.link_service.short_url(code)
    })))
}

/// Lists the caller's links.
///
/// # Endpoint
///
/// `GET /api/links?page=1&limit=20&sort=created_at&search=promo`
///
/// `sort` is one of `created_at` (newest first), `click_count` (most clicked
/// first) or `title`. `search` matches title, URL, code and tags.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let query = params.into_query(user.user_id)?;
    let (page, limit) = (query.page, query.limit);

    let result = state.link_service.list_links(query).await?;

    Ok(Json(LinkListResponse {
        links: result
            .links
            .into_iter()
            .map(|link| to_response(&state, link))
            .collect(),
        pagination: PaginationMeta::new(page, limit, result.total),
    }))
}

/// Public link details by code.
///
/// # Endpoint
///
/// `GET /api/links/info/{code}`
pub async fn link_info_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_by_code(&code).await?;
    Ok(Json(to_response(&state, link)))
}

/// `GET /api/links/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(id, user.user_id).await?;
    Ok(Json(to_response(&state, link)))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PUT /api/links/{id}`
///
/// # Request Body
///
/// ```json
/// {
///   "title": "New title",
///   "is_active": false,
///   "expires_at": null
/// }
/// ```
///
/// The resolver cache entry is invalidated so the next redirect sees the change.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to someone else.
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(id, user.user_id, payload.into())
        .await?;

    Ok(Json(to_response(&state, link)))
}

/// Deletes a link and its click logs.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.link_service.delete_link(id, user.user_id).await?;

    Ok(Json(MessageResponse {
        message: "Link deleted".to_string(),
    }))
}

/// Flips `is_active`.
///
/// # Endpoint
///
/// `POST /api/links/{id}/toggle-status`
pub async fn toggle_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.toggle_status(id, user.user_id).await?;
    Ok(Json(to_response(&state, link)))
}
