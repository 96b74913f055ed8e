//! Guarded navigation

use crate::error::RouterError;
use crate::guard::{NavigationDecision, NavigationGuard};
use crate::history::History;
use crate::matcher::{href, resolve};
use counsel_core::Location;
use counsel_http::AuthManager;
use std::sync::Arc;
use tracing::{debug, warn};

/// Redirects followed before giving up on a navigation
pub const MAX_REDIRECTS: usize = 10;

#[derive(Clone)]
pub struct Router {
    guard: NavigationGuard,
    history: Arc<History>,
}

impl Router {
    /// `history` should be the navigator the auth manager's client was
    /// built with, so forced navigations and guarded ones share one stack
    pub fn new(auth: AuthManager, history: Arc<History>) -> Self {
        Self {
            guard: NavigationGuard::new(auth, history.clone()),
            history,
        }
    }

    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.guard = self.guard.with_app_title(title);
        self
    }

    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Navigate to a path, following guard redirects
    pub async fn push(&self, path: &str) -> Result<Location, RouterError> {
        self.push_location(resolve(path).location).await
    }

    /// Navigate to a location, following guard redirects.
    /// Returns the location actually committed.
    pub async fn push_location(&self, mut to: Location) -> Result<Location, RouterError> {
        let from = self.history.current();

        for _ in 0..=MAX_REDIRECTS {
            match self.guard.before_each(&to, from.as_ref()).await {
                NavigationDecision::Allow => {
                    // A forced navigation to the same view during the guard
                    // run is superseded by the guarded location
                    let current = self.history.current();
                    if current != from && current.is_some_and(|entry| entry.name == to.name) {
                        self.history.replace(to.clone());
                    } else {
                        self.history.commit(to.clone());
                    }
                    return Ok(to);
                }
                NavigationDecision::Redirect(next) => {
                    debug!(from = %to.name, to = %next.name, "Guard redirect");
                    to = next;
                }
            }
        }

        let path = href(&to).unwrap_or_else(|_| to.name.to_string());
        warn!("Redirect loop navigating to {path}");
        Err(RouterError::TooManyRedirects { path })
    }
}
