//! Access token inspection
//!
//! The client never verifies signatures; it only reads the `exp` claim to
//! decide whether a stored token is worth presenting. Anything that cannot
//! be decoded is treated as expired.

use crate::error::{CoreError, CoreResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims the client cares about
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiration time (seconds since the epoch)
    pub exp: i64,
    /// Subject, when present
    #[serde(default)]
    pub sub: Option<String>,
}

/// Decode the payload segment of a JWT without checking its signature
pub fn decode_claims(token: &str) -> CoreResult<Claims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
        _ => return Err(CoreError::invalid_token("expected three segments")),
    };

    // Some issuers keep base64 padding on the payload
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| CoreError::invalid_token(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| CoreError::invalid_token(format!("payload is not a claims object: {e}")))
}

/// Whether `token` is expired at `now`. Decode failures count as expired.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => now.timestamp_millis() >= claims.exp.saturating_mul(1000),
        Err(e) => {
            tracing::error!("Token validation error: {e}");
            true
        }
    }
}

/// Whether `token` is expired right now
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::unsigned_token;
    use chrono::Duration;

    #[test]
    fn test_future_expiry_is_valid() {
        let token = unsigned_token((Utc::now() + Duration::hours(1)).timestamp());
        assert!(!is_expired(&token));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let token = unsigned_token((Utc::now() - Duration::seconds(5)).timestamp());
        assert!(is_expired(&token));
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let now = Utc::now();
        let token = unsigned_token(now.timestamp());
        let at_exp = DateTime::from_timestamp(now.timestamp(), 0).unwrap();
        assert!(is_expired_at(&token, at_exp));
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        assert!(is_expired(""));
        assert!(is_expired("not-a-jwt"));
        assert!(is_expired("a.!!!.c"));
        assert!(is_expired("a.b.c.d"));

        // Valid base64 but no exp claim
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"42"}"#);
        assert!(is_expired(&format!("h.{payload}.s")));
    }

    #[test]
    fn test_decode_claims_reads_subject() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"42","exp":10}"#);
        let claims = decode_claims(&format!("h.{payload}.s")).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.exp, 10);
    }
}
