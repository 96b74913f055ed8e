//! CLI configuration utilities

use anyhow::{Context, Result};
use counsel_core::ClientConfig;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "COUNSEL_STATE_DIR";

/// Load client configuration from defaults, an optional file and the environment
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    ClientConfig::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })
}

/// Data directory: command line, then environment, then config file, then
/// the platform data directory
pub fn resolve_data_dir(cli_override: Option<PathBuf>, config: &ClientConfig) -> PathBuf {
    cli_override
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("counsel")
        })
}
