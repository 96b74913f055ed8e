//! Request descriptions
//!
//! A request is kept as plain data so the client can rebuild and resend it
//! after a token refresh. `attempt` counts sends that ended in a 401.

use super::ClientError;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Description of one API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the client's base URL, also the rate-limit key
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Number of 401-triggered retries already made
    pub attempt: u32,
    /// Whether a 401 should trigger a token refresh and one resend
    pub refresh_on_unauthorized: bool,
}

impl ApiRequest {
    /// Retries allowed after a 401
    pub const MAX_UNAUTHORIZED_RETRIES: u32 = 1;

    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            attempt: 0,
            refresh_on_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a JSON body that is already a value
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Do not attempt a token refresh when this request gets a 401
    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_unauthorized = false;
        self
    }

    /// Whether a 401 on this request may still be retried
    pub fn can_retry_unauthorized(&self) -> bool {
        self.refresh_on_unauthorized && self.attempt < Self::MAX_UNAUTHORIZED_RETRIES
    }
}
