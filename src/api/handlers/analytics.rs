//! Handlers for analytics endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::analytics::{
    DashboardResponse, ExportParams, LinkAnalyticsResponse, PeriodParams,
};
use crate::api::dto::link::LinkResponse;
use crate::application::services::analytics_service::ExportFormat;
use crate::domain::analytics::Period;
use crate::domain::entities::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Overview of the caller's links for a period.
///
/// # Endpoint
///
/// `GET /api/analytics/dashboard?period=week`
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<DashboardResponse>, AppError> {
    let period = params.period();
    let dashboard = state
        .analytics_service
        .dashboard(user.user_id, period)
        .await?;

    Ok(Json(DashboardResponse {
        period: period.as_str(),
        total_links: dashboard.total_links,
        active_links: dashboard.active_links,
        total_clicks: dashboard.total_clicks,
        today_clicks: dashboard.today_clicks,
        period_clicks: dashboard.period_clicks,
        click_trends: dashboard.click_trends,
        recent_links: dashboard
            .recent_links
            .into_iter()
            .map(|link| {
                let short_url = state.link_service.short_url(&link.short_code);
                LinkResponse::new(link, short_url)
            })
            .collect(),
    }))
}

/// Click analytics of one link.
///
/// # Endpoint
///
/// `GET /api/analytics/links/{id}?period=week`
///
/// # Response
///
/// ```json
/// {
///   "summary": { "total_clicks": 3, "unique_clicks": 2, "peak_hour": "14:00",
///                "peak_day": "2026-03-02", "avg_daily_clicks": 1.5 },
///   "time_series": [{ "date": "2026-03-01", "clicks": 1, "unique_clicks": 1 }],
///   "geographic": [{ "country": "unknown", "clicks": 3, "percentage": 1.0 }],
///   "devices": [{ "type": "mobile", "clicks": 2, "percentage": 0.6667 }],
///   "browsers": [{ "browser": "Safari", "clicks": 2, "percentage": 0.6667 }],
///   "operating_systems": [{ "os": "iOS", "clicks": 2, "percentage": 0.6667 }],
///   "referrers": [{ "source": "direct", "clicks": 3, "percentage": 1.0 }]
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to someone else.
pub async fn link_analytics_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<LinkAnalyticsResponse>, AppError> {
    let report = state
        .analytics_service
        .link_analytics(id, user.user_id, params.period())
        .await?;

    Ok(Json(report.into()))
}

/// Downloads the raw click logs of one link.
///
/// # Endpoint
///
/// `GET /api/analytics/export/{id}?format=csv&period=month`
///
/// # Errors
///
/// Returns 400 Bad Request for a format other than `csv` or `json`.
/// Returns 404 Not Found if the link doesn't exist or belongs to someone else.
pub async fn export_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let format = ExportFormat::parse(params.format.as_deref())?;
    let period = Period::parse(params.period.as_deref());

    let file = state
        .analytics_service
        .export(id, user.user_id, period, format)
        .await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
        .map_err(|e| {
            AppError::internal("Invalid export filename", json!({ "error": e.to_string() }))
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
