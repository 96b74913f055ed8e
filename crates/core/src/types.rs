use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a user can hold. Unknown role strings are rejected on
/// deserialization so a malformed profile never grants access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Professional,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Professional, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Professional => "professional",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "professional" => Ok(Role::Professional),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User profile as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default, alias = "verified")]
    pub is_verified: bool,
}

/// Access/refresh token pair held by a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Body returned by the login and register endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

impl AuthResponse {
    /// Split into the token pair and user profile
    pub fn into_parts(self) -> (AuthTokens, User) {
        (
            AuthTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
            },
            self.user,
        )
    }
}

/// Body returned by the token refresh endpoint.
///
/// `refresh_token` is only present when the backend rotates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Verification-code login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub verification_code: String,
}

/// Request for a verification code to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeRequest {
    pub phone_number: String,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// New-account registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub phone_number: String,
    pub verification_code: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Error body shape used by the backend (`{"detail": "..."}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_round_trips_lowercase() {
        assert_eq!(serde_json::to_value(Role::Professional).unwrap(), "professional");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_rejects_unknown_role() {
        let result = serde_json::from_value::<User>(json!({
            "id": "1",
            "username": "mallory",
            "role": "root",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_accepts_verified_alias() {
        let user: User = serde_json::from_value(json!({
            "id": "7",
            "username": "li",
            "email": "li@example.com",
            "role": "user",
            "verified": true,
        }))
        .unwrap();
        assert!(user.is_verified);
        assert_eq!(user.email.as_deref(), Some("li@example.com"));
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        let body: RefreshResponse =
            serde_json::from_value(json!({ "access_token": "abc" })).unwrap();
        assert!(body.refresh_token.is_none());
    }
}
