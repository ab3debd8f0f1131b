//! API banner.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

/// `GET /api`: service name and version.
pub async fn banner_handler() -> Json<BannerResponse> {
    Json(BannerResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        description: env!("CARGO_PKG_DESCRIPTION"),
    })
}
