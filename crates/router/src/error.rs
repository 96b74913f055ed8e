//! Router error types

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Guards kept redirecting without settling on a location
    #[error("Too many redirects navigating to {path}")]
    TooManyRedirects { path: String },

    /// A location is missing a parameter its route pattern needs
    #[error("Missing route parameter `{param}` for {path}")]
    MissingParam { path: &'static str, param: String },
}
