//! Validation of redirect targets.

use serde_json::json;
use url::Url;

use crate::error::AppError;

/// Maximum stored length of a target URL.
pub const MAX_URL_LENGTH: usize = 2048;

/// Checks that `raw` is an absolute HTTP(S) URL with a host and returns it trimmed.
///
/// The URL is stored as given rather than re-serialized, so the `Location`
/// header matches what the owner submitted.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for malformed URLs, non-HTTP(S) schemes
/// (e.g. `javascript:`), missing hosts and overlong input.
pub fn validate_target_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(AppError::bad_request("URL is required", json!({})));
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(AppError::bad_request(
            "URL is too long",
            json!({ "max_length": MAX_URL_LENGTH }),
        ));
    }

    let parsed = Url::parse(trimmed).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "Only HTTP and HTTPS protocols are allowed",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::bad_request("URL must have a host", json!({})));
    }

    Ok(trimmed.to_string())
}

/// Reduces a referrer to its host, or `None` when it is absent or unparsable.
pub fn referrer_host(referrer: Option<&str>) -> Option<String> {
    referrer
        .and_then(|r| Url::parse(r).ok())
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}
