//! Authentication API client methods

use super::request::ApiRequest;
use super::{ApiClient, ClientError};
use counsel_core::types::{
    LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, SendCodeRequest,
};
use counsel_core::{AuthResponse, User};
use tracing::{debug, error};

pub const LOGIN_PATH: &str = "/auth/login/verify";
pub const SEND_CODE_PATH: &str = "/auth/send-code";
pub const REGISTER_PATH: &str = "/auth/register";
pub const ME_PATH: &str = "/auth/me";
pub const REFRESH_PATH: &str = "/auth/token/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";

impl ApiClient {
    /// Exchange a phone number and verification code for tokens
    pub async fn login_verify(
        &self,
        phone_number: &str,
        verification_code: &str,
    ) -> Result<AuthResponse, ClientError> {
        let request = ApiRequest::post(LOGIN_PATH)
            .json(&LoginRequest {
                phone_number: phone_number.to_string(),
                verification_code: verification_code.to_string(),
            })?
            .without_refresh();
        self.send(request).await
    }

    /// Ask the backend to send a verification code
    pub async fn send_code(&self, phone_number: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post(SEND_CODE_PATH)
            .json(&SendCodeRequest {
                phone_number: phone_number.to_string(),
            })?
            .without_refresh();
        self.dispatch(request).await.map(|_| ())
    }

    /// Create an account
    pub async fn register_account(
        &self,
        registration: &RegisterRequest,
    ) -> Result<AuthResponse, ClientError> {
        let request = ApiRequest::post(REGISTER_PATH)
            .json(registration)?
            .without_refresh();
        self.send(request).await
    }

    /// Profile of the user the current token belongs to
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.send(ApiRequest::get(ME_PATH)).await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// The refresh token is replaced only when the backend returns a new
    /// one. On failure the session is cleared and the error returned.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let Some(refresh_token) = self.session.refresh_token().await else {
            return Err(ClientError::NoRefreshToken);
        };

        let result = async {
            let request = ApiRequest::post(REFRESH_PATH)
                .json(&RefreshRequest {
                    refresh_token: refresh_token.clone(),
                })?
                .without_refresh();
            let value = self.send_once(&request).await?;
            let body: RefreshResponse = serde_json::from_value(value)?;

            let next_refresh = body.refresh_token.unwrap_or(refresh_token);
            self.session
                .set_tokens(&body.access_token, Some(&next_refresh))
                .await?;
            Ok::<(), ClientError>(())
        }
        .await;

        match result {
            Ok(()) => {
                debug!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                error!("Token refresh failed: {e}");
                self.session.clear().await;
                Err(e)
            }
        }
    }

    /// Tell the backend the session is over, then clear it locally.
    /// Backend errors are logged and ignored.
    pub async fn logout(&self) {
        if self.session.access_token().await.is_some() {
            let request = ApiRequest::post(LOGOUT_PATH).without_refresh();
            if let Err(e) = self.send_once(&request).await {
                error!("Logout API failed: {e}");
            }
        }
        self.session.clear().await;
    }
}
