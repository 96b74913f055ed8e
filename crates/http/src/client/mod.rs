//! Counsel HTTP client
//!
//! Every call goes through the same pipeline. Outgoing: bearer token,
//! per-endpoint rate limit, body sanitization, `X-Request-Time` stamp.
//! Incoming: payload sanitization, one refresh-and-resend on 401, a
//! redirect to the unauthorized view on 403, and localized errors for 429
//! and for requests that never got a response.

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod request;

use chrono::Utc;
use counsel_core::sanitize::{sanitize_text, sanitize_value};
use counsel_core::{
    ClientConfig, CookieOptions, Location, LoggingNavigator, MemoryStore, Navigator,
    RateLimitConfig, RouteName, Session,
};
use error::{ClientError, ErrorBody};
use rate_limit::RateLimiter;
use reqwest::{Client, ClientBuilder, StatusCode, header};
use request::ApiRequest;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Header carrying the send time in epoch milliseconds
pub const REQUEST_TIME_HEADER: &str = "X-Request-Time";

/// Counsel API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
    limiter: RateLimiter,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session this client authenticates with
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Send a request and deserialize the sanitized response
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let value = self.dispatch(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    /// Send a request, refreshing the session and resending once on 401
    pub async fn dispatch(&self, mut request: ApiRequest) -> Result<Value, ClientError> {
        loop {
            match self.send_once(&request).await {
                Err(ClientError::AuthenticationFailed(message))
                    if request.can_retry_unauthorized() =>
                {
                    request.attempt += 1;
                    debug!(
                        path = %request.path,
                        attempt = request.attempt,
                        "Unauthorized ({message}), refreshing token"
                    );

                    if let Err(refresh_error) = self.refresh().await {
                        warn!("Token refresh failed, logging out: {refresh_error}");
                        self.logout().await;
                        self.navigator.navigate(Location::named(RouteName::Login));
                        return Err(refresh_error);
                    }
                }
                result => return result,
            }
        }
    }

    /// One pass through the request and response pipeline, without 401 handling
    pub(crate) async fn send_once(&self, request: &ApiRequest) -> Result<Value, ClientError> {
        if !self.limiter.try_acquire(&request.path) {
            return Err(ClientError::RateLimited {
                endpoint: request.path.clone(),
                local: true,
            });
        }

        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), url);

        if let Some(token) = self.session.access_token().await {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(&sanitize_value(body.clone()));
        }
        builder = builder.header(REQUEST_TIME_HEADER, Utc::now().timestamp_millis().to_string());

        let response = builder.send().await.map_err(|e| {
            error!("Network error: {e}");
            ClientError::Network(e)
        })?;

        self.handle_response(&request.path, response).await
    }

    async fn handle_response(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<Value, ClientError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return Ok(success_payload(path, &body));
        }

        let body = ErrorBody::parse(&response.text().await.unwrap_or_default());

        match status {
            StatusCode::FORBIDDEN => {
                error!("Access denied: {body}");
                self.navigator
                    .navigate(Location::named(RouteName::Unauthorized));
                Err(ClientError::Forbidden(body))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                error!("Rate limit exceeded");
                Err(ClientError::RateLimited {
                    endpoint: path.to_string(),
                    local: false,
                })
            }
            _ => Err(ClientError::from_status(status, body)),
        }
    }
}

/// Sanitized payload of a successful response. Bodies that are not JSON
/// come back as a sanitized string.
fn success_payload(path: &str, body: &str) -> Value {
    let body = body.trim();
    if body.is_empty() {
        return Value::Null;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => sanitize_value(value),
        Err(_) => {
            debug!(path, "Non-JSON success body");
            Value::String(sanitize_text(body))
        }
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    session: Option<Session>,
    rate_limit: Option<RateLimitConfig>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    /// Start from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::default()
            .base_url(config.base_url.clone())
            .timeout(config.timeout())
            .rate_limit(config.rate_limit.clone())
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Share an existing session
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Override the per-endpoint rate limit
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Where forced navigations (login, unauthorized) are sent
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent("counsel-client/0.1.0");
        }

        let client = client_builder.build()?;

        let session = self.session.unwrap_or_else(|| {
            Session::new(Arc::new(MemoryStore::new()), CookieOptions::default())
        });
        let limiter = self
            .rate_limit
            .as_ref()
            .map(RateLimiter::from_config)
            .unwrap_or_default();
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(LoggingNavigator));

        Ok(ApiClient {
            client,
            base_url,
            session,
            limiter,
            navigator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_payload_accepts_plain_text() {
        assert_eq!(success_payload("/auth/send-code", "OK"), Value::String("OK".into()));
        assert_eq!(
            success_payload("/notes", "<b>saved</b>"),
            Value::String("saved".into())
        );
        assert_eq!(success_payload("/auth/logout", "  "), Value::Null);
        assert_eq!(
            success_payload("/cases", r#"{"title":"<i>x</i>"}"#),
            serde_json::json!({"title": "x"})
        );
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
    }
}
