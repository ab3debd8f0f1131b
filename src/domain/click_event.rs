//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// An in-memory representation of a click for async processing.
///
/// Built on the redirect path from the raw request context and handed to the
/// background worker, which derives the IP hash and User-Agent classification
/// before persisting. The redirect response never waits on that work.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// Blank header values are treated as absent.
    pub fn new(
        link_id: i64,
        ip: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            ip,
            user_agent: non_blank(user_agent),
            referrer: non_blank(referrer),
            occurred_at: Utc::now(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
