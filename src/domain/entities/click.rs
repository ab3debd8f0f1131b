//! Click log entity representing a single resolution of a short link.

use chrono::{DateTime, Utc};

/// Sentinel stored when a classification field cannot be determined.
pub const UNKNOWN: &str = "unknown";

/// Coarse device classification derived from the User-Agent header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Other,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
            DeviceType::Other => "other",
        }
    }
}

/// An immutable record of one resolution event against a link.
///
/// Stores a date-salted hash of the client IP, never the raw address.
#[derive(Debug, Clone)]
pub struct ClickLog {
    pub id: i64,
    pub link_id: i64,
    pub ip_hash: String,
    pub user_agent: String,
    pub device_type: String,
    pub browser: String,
    pub os: String,
    pub country: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

/// Input data for appending a click log.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub ip_hash: String,
    pub user_agent: String,
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
    pub country: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}
