//! Input validation helpers
//!
//! Validation is synchronous and never errors: callers get a `bool` and
//! decide what message to show.

use rand::RngCore;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Mainland China mobile numbers
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("valid phone regex"));

static UUID_V4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("valid uuid regex")
});

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const PASSWORD_MIN_LEN: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

/// At least eight characters drawn from letters, digits and `@$!%*?&`,
/// including one of each: lowercase, uppercase, digit, special.
pub fn is_strong_password(password: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);

    password.chars().count() >= PASSWORD_MIN_LEN
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

pub fn is_valid_uuid(uuid: &str) -> bool {
    UUID_V4.is_match(uuid)
}

/// 32 random bytes, hex encoded
pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Configuration field validators
pub mod validators {
    use crate::error::{CoreError, CoreResult};

    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field: &str) -> CoreResult<()> {
        if value.trim().is_empty() {
            return Err(CoreError::invalid_config(format!("{field}: cannot be empty")));
        }
        Ok(())
    }

    /// Validate URL format
    pub fn validate_url(url: &str, field: &str) -> CoreResult<()> {
        url::Url::parse(url)
            .map_err(|e| CoreError::invalid_config(format!("{field}: invalid URL - {e}")))?;
        Ok(())
    }

    /// Validate that a value is within range
    pub fn validate_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> CoreResult<()> {
        if value < min || value > max {
            return Err(CoreError::invalid_config(format!(
                "{field}: must be between {min} and {max}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("zhang.san@example.com"));
        assert!(!is_valid_email("zhang san@example.com"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("13812345678"));
        assert!(is_valid_phone("19900000000"));
        assert!(!is_valid_phone("12812345678"));
        assert!(!is_valid_phone("1381234567"));
        assert!(!is_valid_phone("138123456789"));
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Abcdef1!"));
        assert!(!is_strong_password("Abcde1!"));
        assert!(!is_strong_password("abcdefg1!"));
        assert!(!is_strong_password("ABCDEFG1!"));
        assert!(!is_strong_password("Abcdefgh!"));
        assert!(!is_strong_password("Abcdefg12"));
        assert!(!is_strong_password("Abcdef1!#"));
    }

    #[test]
    fn test_uuid() {
        assert!(is_valid_uuid("9b2f5a3e-1c4d-4e8f-a0b1-c2d3e4f5a6b7"));
        assert!(is_valid_uuid("9B2F5A3E-1C4D-4E8F-A0B1-C2D3E4F5A6B7"));
        assert!(!is_valid_uuid("9b2f5a3e-1c4d-3e8f-a0b1-c2d3e4f5a6b7"));
        assert!(!is_valid_uuid("not-a-uuid"));
    }

    #[test]
    fn test_csrf_token_shape() {
        let a = generate_csrf_token();
        let b = generate_csrf_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_validators() {
        assert!(validators::validate_not_empty("  ", "base_url").is_err());
        assert!(validators::validate_url("http://localhost:8000/api", "base_url").is_ok());
        assert!(validators::validate_url("::", "base_url").is_err());
        assert!(validators::validate_range(0u32, 1, 10, "max_requests").is_err());
    }
}
