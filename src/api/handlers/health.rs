//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1` on the pool
/// 2. **Click Queue**: Channel open, free slots out of capacity
/// 3. **Cache**: Redis PING, or reported as disabled
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "click_queue": { "status": "ok", "message": "Free slots: 10000/10000" },
///     "cache": { "status": "ok", "message": "Caching disabled" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let click_queue = check_click_queue(&state);
    let cache = check_cache(&state).await;

    let all_healthy = database.is_ok() && click_queue.is_ok() && cache.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            database,
            click_queue,
            cache,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.db.as_ref())
        .await
    {
        Ok(_) => CheckStatus::ok("Connected"),
        Err(e) => {
            tracing::warn!("Health check database error: {}", e);
            CheckStatus::error("Database unreachable")
        }
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.click_queue.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Free slots: {}/{}",
            state.click_queue.capacity(),
            state.click_queue.max_capacity()
        ))
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    match state.cache.backend() {
        "disabled" => CheckStatus::ok("Caching disabled"),
        backend => {
            if state.cache.health_check().await {
                CheckStatus::ok(format!("{backend} connected"))
            } else {
                CheckStatus::error(format!("{backend} connection failed"))
            }
        }
    }
}
