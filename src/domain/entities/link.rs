//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a link may currently be followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Live,
    Disabled,
    Expired,
}

impl Availability {
    /// Evaluates activation and expiry at `now`.
    ///
    /// A disabled link is reported as [`Availability::Disabled`] regardless of its
    /// expiry. A link is live only strictly before `expires_at`.
    pub fn evaluate(
        is_active: bool,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if !is_active {
            return Self::Disabled;
        }
        if expires_at.is_some_and(|e| now >= e) {
            return Self::Expired;
        }
        Self::Live
    }
}

/// A shortened URL owned by a user.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub user_id: i64,
    pub short_code: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link has reached its expiry time at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        Availability::evaluate(true, self.expires_at, now) == Availability::Expired
    }

    pub fn availability(&self, now: DateTime<Utc>) -> Availability {
        Availability::evaluate(self.is_active, self.expires_at, now)
    }
}

/// The subset of a link needed to serve a redirect.
///
/// This is what the resolver caches, so it must stay serializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub link_id: i64,
    pub short_code: String,
    pub original_url: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ResolvedLink {
    pub fn availability(&self, now: DateTime<Utc>) -> Availability {
        Availability::evaluate(self.is_active, self.expires_at, now)
    }
}

impl From<&Link> for ResolvedLink {
    fn from(link: &Link) -> Self {
        Self {
            link_id: link.id,
            short_code: link.short_code.clone(),
            original_url: link.original_url.clone(),
            is_active: link.is_active,
            expires_at: link.expires_at,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: i64,
    pub short_code: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Ordering for link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSort {
    #[default]
    CreatedAt,
    ClickCount,
    Title,
}

/// Owner-scoped listing query.
#[derive(Debug, Clone)]
pub struct LinkQuery {
    pub user_id: i64,
    pub page: i64,
    pub limit: i64,
    pub sort: LinkSort,
    pub search: Option<String>,
}

impl LinkQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// One page of links plus the total number of matches.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub total: i64,
}

/// Per-user link totals shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTotals {
    pub total_links: i64,
    pub active_links: i64,
    pub total_clicks: i64,
}

#[cfg(test)]
pub(crate) fn sample_link(id: i64, code: &str, url: &str) -> Link {
    let now = Utc::now();
    Link {
        id,
        user_id: 1,
        short_code: code.to_string(),
        original_url: url.to_string(),
        title: None,
        description: None,
        tags: None,
        is_active: true,
        expires_at: None,
        click_count: 0,
        created_at: now,
        updated_at: now,
    }
}
