//! Fixtures shared by the workspace's test suites

use crate::types::{Role, User};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};

/// Build a JWT-shaped token with the given `exp` claim and a dummy signature
pub fn unsigned_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"test","exp":{exp}}}"#));
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// A token that expires an hour from now
pub fn fresh_token() -> String {
    unsigned_token((Utc::now() + Duration::hours(1)).timestamp())
}

/// A token that expired an hour ago
pub fn stale_token() -> String {
    unsigned_token((Utc::now() - Duration::hours(1)).timestamp())
}

/// A verified user with the given role
pub fn sample_user(role: Role) -> User {
    User {
        id: format!("{role}-1"),
        username: format!("test-{role}"),
        email: Some(format!("{role}@example.com")),
        role,
        is_verified: true,
    }
}
