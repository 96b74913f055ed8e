//! Navigation guard
//!
//! Runs before every navigation: sets the document title, recovers the
//! session for protected routes, and enforces role restrictions.

use crate::matcher::href;
use crate::routes::{dashboard_for, route};
use counsel_core::{DEFAULT_APP_TITLE, Location, Navigator, RouteName};
use counsel_http::AuthManager;
use std::sync::Arc;
use tracing::{debug, info};

/// Query parameter carrying the path to return to after login
pub const REDIRECT_QUERY: &str = "redirect";

/// Outcome of a guard run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(Location),
}

#[derive(Clone)]
pub struct NavigationGuard {
    auth: AuthManager,
    navigator: Arc<dyn Navigator>,
    app_title: String,
}

impl NavigationGuard {
    pub fn new(auth: AuthManager, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            app_title: DEFAULT_APP_TITLE.to_string(),
        }
    }

    /// Title used for routes without one
    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = title.into();
        self
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub async fn before_each(&self, to: &Location, from: Option<&Location>) -> NavigationDecision {
        let meta = route(to.name);
        debug!(to = %to.name, from = ?from.map(|l| l.name), "Guarding navigation");

        let title = if meta.title.is_empty() {
            self.app_title.as_str()
        } else {
            meta.title
        };
        self.navigator.set_title(title);

        let session = self.auth.session();

        if meta.requires_auth() && !session.is_authenticated().await {
            self.auth.init().await;

            if !session.is_authenticated().await {
                info!(to = %to.name, "Not signed in, redirecting to login");
                let mut login = Location::named(RouteName::Login);
                if let Ok(path) = href(to) {
                    login = login.with_query(REDIRECT_QUERY, path);
                }
                return NavigationDecision::Redirect(login);
            }
        }

        let role = session.user_role().await;

        if meta.requires_auth() && !meta.access.allows(role) {
            info!(to = %to.name, ?role, "Role not permitted");
            return NavigationDecision::Redirect(Location::named(RouteName::Unauthorized));
        }

        if to.name == RouteName::Login && session.is_authenticated().await {
            return NavigationDecision::Redirect(Location::named(dashboard_for(role)));
        }

        NavigationDecision::Allow
    }
}
