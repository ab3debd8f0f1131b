//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::sync::LazyLock;
use validator::Validate;

use crate::api::dto::pagination::PaginationMeta;
use crate::application::services::link_service::{BatchOutcome, CreateLink};
use crate::domain::entities::{Link, LinkPatch};

static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]*$").unwrap());

/// Link JSON returned by every link endpoint.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub user_id: i64,
    pub original_url: String,
    pub short_code: String,
    pub short_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub click_count: i64,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn new(link: Link, short_url: String) -> Self {
        Self {
            id: link.id,
            user_id: link.user_id,
            original_url: link.original_url,
            short_code: link.short_code,
            short_url,
            title: link.title,
            description: link.description,
            tags: link.tags,
            click_count: link.click_count,
            is_active: link.is_active,
            expires_at: link.expires_at,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Request body for `POST /api/links/create`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub original_url: String,

    /// Custom short code; a random one is generated when absent or empty.
    #[serde(alias = "custom_code")]
    #[validate(regex(path = "*SHORT_CODE_REGEX"))]
    pub short_code: Option<String>,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(length(max = 500))]
    pub tags: Option<String>,

    /// After this time the link answers 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        CreateLink {
            original_url: req.original_url,
            custom_code: req.short_code,
            title: req.title,
            description: req.description,
            tags: req.tags,
            expires_at: req.expires_at,
        }
    }
}

/// Request body for `PUT /api/links/{id}`.
///
/// All fields are optional; only provided fields are changed. An empty string
/// clears `title`, `description` or `tags`.
///
/// # `expires_at` semantics
///
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear expiry (link never expires)
/// - **Timestamp** → set new expiry
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(length(max = 500))]
    pub tags: Option<String>,

    pub is_active: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        LinkPatch {
            title: req.title,
            description: req.description,
            tags: req.tags,
            is_active: req.is_active,
            expires_at: req.expires_at,
        }
    }
}

/// Request body for `POST /api/links/batch`.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchCreateRequest {
    #[validate(length(min = 1, max = 100, message = "Batch must contain 1-100 URLs"))]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct BatchCreateResponse {
    pub created: Vec<LinkResponse>,
    pub failed: Vec<BatchFailure>,
}

impl BatchCreateResponse {
    pub fn new(outcome: BatchOutcome, short_url: impl Fn(&str) -> String) -> Self {
        Self {
            created: outcome
                .created
                .into_iter()
                .map(|link| {
                    let url = short_url(&link.short_code);
                    LinkResponse::new(link, url)
                })
                .collect(),
            failed: outcome
                .failed
                .into_iter()
                .map(|(url, err)| BatchFailure {
                    url,
                    error: err.to_error_info().detail,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub links: Vec<LinkResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
