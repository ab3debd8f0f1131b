//! DTOs for the redirect info and click endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct RedirectInfoResponse {
    pub original_url: String,
}

/// Optional body of `POST /api/redirect/{code}/click`.
#[derive(Debug, Default, Deserialize)]
pub struct ClickRequest {
    pub referrer: Option<String>,
}
