//! Daily-rotating client IP hashing.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Hashes a client IP salted with the UTC calendar date of `at`.
///
/// Returns the lowercase hex SHA-256 of `ip` followed by `YYYY-MM-DD`. The same
/// address hashes identically within a UTC day and differently across days, so
/// unique visitors can be counted per day without storing the address.
pub fn hash_ip(ip: &str, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(at.format("%Y-%m-%d").to_string().as_bytes());
    hex::encode(hasher.finalize())
}
