//! Link creation, management and resolution service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{
    Availability, Link, LinkPage, LinkPatch, LinkQuery, NewLink, ResolvedLink,
};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::url_validator::validate_target_url;

/// Attempts at allocating an unused random code before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Upper bound on URLs accepted by one batch request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Input for creating one link.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub original_url: String,
    pub custom_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a batch create: successes and per-URL failures.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub created: Vec<Link>,
    pub failed: Vec<(String, AppError)>,
}

/// Service for creating, managing and resolving short links.
///
/// Owns the resolver cache: lookups by code go through it, and every mutation
/// of a link invalidates its entry.
pub struct LinkService<L: LinkRepository> {
    link_repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    base_url: String,
    reserved_codes: Vec<String>,
    cache_ttl_seconds: Option<u64>,
}

impl<L: LinkRepository> LinkService<L> {
    /// Creates a new link service.
    ///
    /// `base_url` is the public origin used to build `short_url`s.
    /// `reserved_codes` are extra path segments (frontend routes) that custom
    /// codes may not take.
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<dyn CacheService>,
        base_url: impl Into<String>,
        reserved_codes: Vec<String>,
    ) -> Self {
        Self {
            link_repository,
            cache,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            reserved_codes,
            cache_ttl_seconds: None,
        }
    }

    /// Overrides the cache TTL used for resolved links.
    pub fn with_cache_ttl(mut self, ttl_seconds: u64) -> Self {
        self.cache_ttl_seconds = Some(ttl_seconds);
        self
    }

    /// Creates a short link owned by `user_id`.
    ///
    /// # Code Allocation
    ///
    /// - A custom code is validated (charset, 3-20 characters, not reserved) and
    ///   must be unused
    /// - Otherwise a random 6-character code is drawn, retrying on collision up
    ///   to [`MAX_CODE_ATTEMPTS`] times
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid URL or custom code.
    /// Returns [`AppError::Conflict`] if the custom code is taken, including a
    /// race lost at insert time.
    /// Returns [`AppError::Internal`] when the retry budget is exhausted.
    pub async fn create_link(&self, user_id: i64, input: CreateLink) -> Result<Link, AppError> {
        let original_url = validate_target_url(&input.original_url)?;

        let short_code = match input.custom_code.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => {
                validate_custom_code(custom, &self.reserved_codes)?;

                if self.link_repository.exists_by_code(custom).await? {
                    return Err(AppError::conflict(
                        "Short code already exists",
                        json!({ "short_code": custom }),
                    ));
                }

                custom.to_string()
            }
            _ => self.generate_unique_code().await?,
        };

        let link = self
            .link_repository
            .create(NewLink {
                user_id,
                short_code,
                original_url,
                title: non_empty(input.title),
                description: non_empty(input.description),
                tags: non_empty(input.tags),
                expires_at: input.expires_at,
            })
            .await?;

        metrics::counter!("links_created_total").increment(1);
        debug!(link_id = link.id, code = %link.short_code, "Link created");

        Ok(link)
    }

    /// Creates one link per URL, collecting failures instead of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `urls` is empty or longer than
    /// [`MAX_BATCH_SIZE`]. Per-URL errors are reported in the outcome.
    pub async fn batch_create(
        &self,
        user_id: i64,
        urls: Vec<String>,
    ) -> Result<BatchOutcome, AppError> {
        if urls.is_empty() || urls.len() > MAX_BATCH_SIZE {
            return Err(AppError::bad_request(
                format!("Batch must contain 1-{} URLs", MAX_BATCH_SIZE),
                json!({ "provided": urls.len() }),
            ));
        }

        let mut outcome = BatchOutcome::default();
        for url in urls {
            let input = CreateLink {
                original_url: url.clone(),
                ..CreateLink::default()
            };
            match self.create_link(user_id, input).await {
                Ok(link) => outcome.created.push(link),
                Err(err) => outcome.failed.push((url, err)),
            }
        }

        Ok(outcome)
    }

    pub async fn list_links(&self, query: LinkQuery) -> Result<LinkPage, AppError> {
        self.link_repository.list(query).await
    }

    /// Retrieves a link owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if it does not exist or belongs to someone else.
    pub async fn get_link(&self, id: i64, user_id: i64) -> Result<Link, AppError> {
        self.link_repository
            .find_by_id_for_user(id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    /// Retrieves a link by code without an ownership check.
    pub async fn get_by_code(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    pub async fn update_link(
        &self,
        id: i64,
        user_id: i64,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        let link = self.link_repository.update(id, user_id, patch).await?;
        self.invalidate(&link.short_code).await;
        Ok(link)
    }

    pub async fn delete_link(&self, id: i64, user_id: i64) -> Result<(), AppError> {
        let link = self.get_link(id, user_id).await?;

        if !self.link_repository.delete(id, user_id).await? {
            return Err(AppError::not_found("Link not found", json!({ "id": id })));
        }

        self.invalidate(&link.short_code).await;
        Ok(())
    }

    /// Flips `is_active` and returns the updated link.
    pub async fn toggle_status(&self, id: i64, user_id: i64) -> Result<Link, AppError> {
        let link = self.get_link(id, user_id).await?;
        let patch = LinkPatch {
            is_active: Some(!link.is_active),
            ..LinkPatch::default()
        };
        self.update_link(id, user_id, patch).await
    }

    /// Resolves a short code to a live link.
    ///
    /// Reads through the cache when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link uses the code.
    /// Returns [`AppError::Gone`] if the link is disabled, or expired at the
    /// current wall-clock time.
    pub async fn resolve(&self, code: &str) -> Result<ResolvedLink, AppError> {
        let resolved = match self.cached(code).await {
            Some(hit) => hit,
            None => {
                let link = self.get_by_code(code).await?;
                let resolved = ResolvedLink::from(&link);
                self.store(&resolved).await;
                resolved
            }
        };

        match resolved.availability(Utc::now()) {
            Availability::Live => Ok(resolved),
            Availability::Disabled => Err(AppError::gone(
                "Link has been disabled",
                json!({ "code": code }),
            )),
            Availability::Expired => Err(AppError::gone(
                "Link has expired",
                json!({ "code": code, "expired_at": resolved.expires_at }),
            )),
        }
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    async fn cached(&self, code: &str) -> Option<ResolvedLink> {
        let raw = self.cache.get(code).await.ok()??;
        match serde_json::from_str(&raw) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                warn!(code, "Discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    async fn store(&self, resolved: &ResolvedLink) {
        match serde_json::to_string(resolved) {
            Ok(raw) => {
                if let Err(e) = self
                    .cache
                    .set(&resolved.short_code, &raw, self.cache_ttl_seconds)
                    .await
                {
                    warn!(code = %resolved.short_code, "Failed to cache link: {}", e);
                }
            }
            Err(e) => warn!(code = %resolved.short_code, "Failed to encode link: {}", e),
        }
    }

    async fn invalidate(&self, code: &str) {
        if let Err(e) = self.cache.invalidate(code).await {
            warn!(code, "Failed to invalidate cached link: {}", e);
        }
    }

    /// Draws random codes until one is unused, up to [`MAX_CODE_ATTEMPTS`] times.
    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code()?;

            if !self.link_repository.exists_by_code(&code).await? {
                return Ok(code);
            }
        }

        Err(AppError::internal(
            "Could not allocate unique code",
            json!({ "attempts": MAX_CODE_ATTEMPTS }),
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
