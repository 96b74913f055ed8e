//! Auth session manager
//!
//! High-level login, registration and session recovery built on
//! [`ApiClient`]. Credential operations report failures as an
//! [`AuthFailure`] carrying a message fit for display.

use crate::client::ApiClient;
use crate::client::error::ClientError;
use counsel_core::{RegisterRequest, Session, User, messages};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// A failed credential operation
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AuthFailure {
    /// The backend's `detail`, or a localized default
    pub message: String,
    #[source]
    source: ClientError,
}

impl AuthFailure {
    fn from_error(source: ClientError, fallback: &str) -> Self {
        let message = source.detail().unwrap_or(fallback).to_string();
        Self { message, source }
    }

    /// Underlying client error
    pub fn error(&self) -> &ClientError {
        &self.source
    }
}

/// Owns the session lifecycle: login, registration, refresh, logout and
/// the recovery path run at start-up and before guarded navigation
#[derive(Clone)]
pub struct AuthManager {
    client: ApiClient,
}

impl AuthManager {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    /// Log in with a phone number and verification code
    pub async fn login(&self, identifier: &str, code: &str) -> Result<User, AuthFailure> {
        let session = self.session();
        session.set_loading(true).await;

        let result = async {
            let response = self.client.login_verify(identifier, code).await?;
            let (tokens, user) = response.into_parts();
            session.establish(tokens, user.clone()).await?;
            Ok::<User, ClientError>(user)
        }
        .await;

        session.set_loading(false).await;

        result
            .inspect(|user| info!(user_id = %user.id, role = %user.role, "Logged in"))
            .map_err(|e| {
                error!("Login failed: {e}");
                AuthFailure::from_error(e, messages::LOGIN_FAILED)
            })
    }

    /// Request a verification code for `phone`
    pub async fn send_verification_code(&self, phone: &str) -> Result<(), AuthFailure> {
        self.client.send_code(phone).await.map_err(|e| {
            error!("Send code failed: {e}");
            AuthFailure::from_error(e, messages::SEND_CODE_FAILED)
        })
    }

    /// Create an account and start a session for it
    pub async fn register(&self, registration: RegisterRequest) -> Result<User, AuthFailure> {
        let session = self.session();
        session.set_loading(true).await;

        let result = async {
            let response = self.client.register_account(&registration).await?;
            let (tokens, user) = response.into_parts();
            session.establish(tokens, user.clone()).await?;
            Ok::<User, ClientError>(user)
        }
        .await;

        session.set_loading(false).await;

        result
            .inspect(|user| info!(user_id = %user.id, "Registered"))
            .map_err(|e| {
                error!("Registration failed: {e}");
                AuthFailure::from_error(e, messages::REGISTER_FAILED)
            })
    }

    /// Fetch the current profile. Any failure invalidates the session.
    pub async fn fetch_user(&self) -> Result<User, ClientError> {
        let result = async {
            let user = self.client.current_user().await?;
            self.session().set_user(user.clone()).await?;
            Ok::<User, ClientError>(user)
        }
        .await;

        if let Err(e) = &result {
            error!("Fetch user failed: {e}");
            self.session().clear().await;
        }
        result
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.client.refresh().await
    }

    /// End the session locally, notifying the backend on a best-effort basis
    pub async fn logout(&self) {
        self.client.logout().await;
        info!("Logged out");
    }

    /// Whether the access token is missing, malformed or expired
    pub async fn is_expired(&self) -> bool {
        self.session().is_expired().await
    }

    /// Recover a session from stored tokens.
    ///
    /// A live access token is validated by fetching the profile. An expired
    /// or missing one is renewed first when a refresh token is stored.
    /// Everything else, and any failure along the way, ends with an empty
    /// session.
    pub async fn init(&self) {
        let session = self.session();

        if session.access_token().await.is_some() && !self.is_expired().await {
            debug!("Restoring session from stored access token");
            let _ = self.fetch_user().await;
            return;
        }

        if session.refresh_token().await.is_some() {
            debug!("Access token expired, attempting refresh");
            let restored = async {
                self.refresh().await?;
                self.fetch_user().await
            }
            .await;

            if let Err(e) = restored {
                warn!("Session restore failed: {e}");
                session.clear().await;
            }
            return;
        }

        session.clear().await;
    }
}
