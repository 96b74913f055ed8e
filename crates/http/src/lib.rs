//! Counsel HTTP layer: API client middleware and the auth session manager

pub mod auth;
pub mod client;

pub use auth::{AuthFailure, AuthManager};
pub use client::error::{ClientError, ErrorBody};
pub use client::request::ApiRequest;
pub use client::{ApiClient, ApiClientBuilder};
