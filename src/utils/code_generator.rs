//! Short code generation and validation utilities.
//!
//! Provides cryptographically secure random code generation and validation
//! for custom user-provided codes.

use std::sync::LazyLock;

use crate::error::AppError;
use regex::Regex;
use serde_json::json;

/// Length of generated codes.
pub const GENERATED_CODE_LENGTH: usize = 6;

pub const CUSTOM_CODE_MIN_LENGTH: usize = 3;
pub const CUSTOM_CODE_MAX_LENGTH: usize = 20;

/// The 64-symbol URL-safe alphabet. Its size divides 256, so `byte % 64` is unbiased.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Top-level path segments owned by the server itself.
pub const RESERVED_CODES: &[&str] = &["api", "health", "qr", "assets"];

static CODE_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid code charset regex"));

/// Generates a random short code of [`GENERATED_CODE_LENGTH`] symbols.
///
/// Uses `getrandom` for entropy. Uniqueness is the caller's concern.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the OS random source fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code()?;
/// assert_eq!(code.len(), 6);
/// ```
pub fn generate_code() -> Result<String, AppError> {
    let mut buffer = [0u8; GENERATED_CODE_LENGTH];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(buffer
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect())
}

/// Returns true if `segment` only uses the short-code alphabet.
///
/// The redirect route uses this to tell link lookups apart from asset paths
/// such as `favicon.ico`.
pub fn is_code_charset(segment: &str) -> bool {
    CODE_CHARSET.is_match(segment)
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters, digits, `_` and `-`
/// - Cannot be a reserved path segment (built-in or in `extra_reserved`)
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any validation rule is violated.
pub fn validate_custom_code(code: &str, extra_reserved: &[String]) -> Result<(), AppError> {
    let len = code.chars().count();
    if !(CUSTOM_CODE_MIN_LENGTH..=CUSTOM_CODE_MAX_LENGTH).contains(&len) {
        return Err(AppError::bad_request(
            format!(
                "Custom code must be {}-{} characters",
                CUSTOM_CODE_MIN_LENGTH, CUSTOM_CODE_MAX_LENGTH
            ),
            json!({ "provided_length": len }),
        ));
    }

    if !is_code_charset(code) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, underscores and hyphens",
            json!({ "code": code }),
        ));
    }

    let lowered = code.to_ascii_lowercase();
    let reserved = RESERVED_CODES.contains(&lowered.as_str())
        || extra_reserved
            .iter()
            .any(|r| r.eq_ignore_ascii_case(code));
    if reserved {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code().unwrap();
        assert_eq!(code.len(), 6);
    }

    #[test]
    fn test_generate_code_url_safe_characters() {
        for _ in 0..200 {
            let code = generate_code().unwrap();
            assert!(is_code_charset(&code), "unexpected symbol in {code}");
        }
    }

    #[test]
    fn test_generate_code_produces_mostly_unique_codes() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code().unwrap()).collect();

        // 64^6 keyspace; a handful of birthday collisions would still be plausible
        assert!(codes.len() > 990);
    }

    #[test]
    fn test_alphabet_has_no_duplicates() {
        let symbols: HashSet<u8> = ALPHABET.iter().copied().collect();
        assert_eq!(symbols.len(), 64);
    }

    #[test]
    fn test_is_code_charset() {
        assert!(is_code_charset("abc_DEF-123"));
        assert!(!is_code_charset("favicon.ico"));
        assert!(!is_code_charset("with space"));
        assert!(!is_code_charset(""));
    }

    #[test]
    fn test_validate_length_bounds() {
        assert!(validate_custom_code("abc", &[]).is_ok());
        assert!(validate_custom_code("a".repeat(20).as_str(), &[]).is_ok());

        let err = validate_custom_code("ab", &[]).unwrap_err();
        assert!(err.to_string().contains("3-20 characters"));
        assert!(validate_custom_code("a".repeat(21).as_str(), &[]).is_err());
        assert!(validate_custom_code("", &[]).is_err());
    }

    #[test]
    fn test_validate_mixed_case_and_symbols() {
        assert!(validate_custom_code("Promo_2025-x", &[]).is_ok());
    }

    #[test]
    fn test_validate_special_characters() {
        let err = validate_custom_code("my.code", &[]).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(validate_custom_code("my code", &[]).is_err());
        assert!(validate_custom_code("код123", &[]).is_err());
    }

    #[test]
    fn test_validate_all_reserved_codes() {
        for &reserved in RESERVED_CODES {
            assert!(
                validate_custom_code(reserved, &[]).is_err(),
                "Reserved code '{}' should be invalid",
                reserved
            );
        }
        assert!(validate_custom_code("API", &[]).is_err());
    }

    #[test]
    fn test_validate_extra_reserved() {
        let extra = vec!["dashboard".to_string(), "login".to_string()];
        assert!(validate_custom_code("dashboard", &extra).is_err());
        assert!(validate_custom_code("Login", &extra).is_err());
        assert!(validate_custom_code("dashboards", &extra).is_ok());
    }
}
