//! Navigation primitives shared by the HTTP client and the router

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every view the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteName {
    Login,
    Dashboard,
    ProfessionalDashboard,
    AdminDashboard,
    Profile,
    CaseDetail,
    CasePool,
    Questionnaire,
    Unauthorized,
    NotFound,
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A navigation target: a named route plus its parameters and query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: RouteName,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

impl Location {
    pub fn named(name: RouteName) -> Self {
        Self {
            name,
            params: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// Side effects a navigation layer exposes to the rest of the client
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Move to `location` without running guards
    fn navigate(&self, location: Location);

    /// Set the document title
    fn set_title(&self, title: &str);
}

/// Navigator that only logs, for clients used without a router
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, location: Location) {
        tracing::info!(route = %location.name, "Navigation requested");
    }

    fn set_title(&self, title: &str) {
        tracing::debug!(title, "Title changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_location_builder() {
        let location = Location::named(RouteName::Login).with_query("redirect", "/case/1");
        assert_eq!(location.query.get("redirect").map(String::as_str), Some("/case/1"));
        assert!(location.params.is_empty());
    }

    #[test]
    fn test_navigator_is_object_safe() {
        let mut mock = MockNavigator::new();
        mock.expect_navigate()
            .with(eq(Location::named(RouteName::Unauthorized)))
            .times(1)
            .return_const(());

        let navigator: &dyn Navigator = &mock;
        navigator.navigate(Location::named(RouteName::Unauthorized));
    }
}
