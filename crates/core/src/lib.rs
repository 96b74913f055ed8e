//! Counsel core types and utilities

pub mod config;
pub mod error;
pub mod messages;
pub mod navigation;
pub mod sanitize;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "tests"))]
pub mod testing;

pub use config::{ClientConfig, DEFAULT_APP_TITLE, RateLimitConfig};
pub use error::{CoreError, CoreResult};
pub use navigation::{Location, LoggingNavigator, Navigator, RouteName};
pub use session::{Session, SessionState};
pub use storage::{CookieOptions, FileStore, MemoryStore, SameSite, SessionStore};
pub use types::{AuthResponse, AuthTokens, RegisterRequest, Role, User};
