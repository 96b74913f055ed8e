//! Client configuration

use crate::error::CoreResult;
use crate::storage::CookieOptions;
use crate::validation::validators;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Title used when a route has none
pub const DEFAULT_APP_TITLE: &str = "法律助手";

/// Prefix of configuration environment variables
const ENV_PREFIX: &str = "COUNSEL";

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL all API paths are appended to
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Client-side request throttling
    pub rate_limit: RateLimitConfig,

    /// Attributes for the token cookies
    pub cookies: CookieOptions,

    /// Fallback document title
    pub app_title: String,

    /// Where persisted session state lives; platform data dir when unset
    pub data_dir: Option<PathBuf>,
}

/// Sliding-window limits applied per endpoint path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed within one window
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
            rate_limit: RateLimitConfig::default(),
            cookies: CookieOptions::default(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            data_dir: None,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load configuration from defaults, an optional file and `COUNSEL__*`
    /// environment variables, in increasing priority. Nested keys use a
    /// double underscore: `COUNSEL__BASE_URL`, `COUNSEL__RATE_LIMIT__MAX_REQUESTS`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or the result is invalid
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        Self::load_from(path, environment())
    }

    fn load_from(path: Option<&Path>, env: config::Environment) -> CoreResult<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder.add_source(env).build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    /// Check field invariants
    pub fn validate(&self) -> CoreResult<()> {
        validators::validate_not_empty(&self.base_url, "base_url")?;
        validators::validate_url(&self.base_url, "base_url")?;
        validators::validate_range(self.timeout_secs, 1, 600, "timeout_secs")?;
        validators::validate_range(self.rate_limit.max_requests, 1, 100_000, "rate_limit.max_requests")?;
        validators::validate_range(self.rate_limit.window_secs, 1, 86_400, "rate_limit.window_secs")?;
        validators::validate_range(self.cookies.expires_days, 1, 365, "cookies.expires_days")?;
        Ok(())
    }
}
