//! In-memory navigation history

use crate::matcher::href;
use crate::routes::route;
use counsel_core::{DEFAULT_APP_TITLE, Location, Navigator};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Committed locations and the current document title.
///
/// Also the [`Navigator`] handed to the HTTP client, so forced
/// navigations (expired session, forbidden) land here without guards.
#[derive(Debug)]
pub struct History {
    entries: RwLock<Vec<Location>>,
    title: RwLock<String>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            title: RwLock::new(DEFAULT_APP_TITLE.to_string()),
        }
    }

    /// Location currently shown
    pub fn current(&self) -> Option<Location> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Path of the current location
    pub fn current_path(&self) -> Option<String> {
        self.current().and_then(|location| href(&location).ok())
    }

    pub fn entries(&self) -> Vec<Location> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn title(&self) -> String {
        self.title
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Step back one entry, returning the new current location
    pub fn back(&self) -> Option<Location> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() > 1 {
            entries.pop();
        }
        entries.last().cloned()
    }

    /// Swap the current entry for `location`
    pub(crate) fn replace(&self, location: Location) {
        debug!(route = %location.name, "Replaced current entry");
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.pop();
        entries.push(location);
    }

    pub(crate) fn commit(&self, location: Location) {
        debug!(route = %location.name, "Navigated");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location);
    }
}

impl Navigator for History {
    fn navigate(&self, location: Location) {
        self.set_title(route(location.name).title);
        self.commit(location);
    }

    fn set_title(&self, title: &str) {
        *self.title.write().unwrap_or_else(PoisonError::into_inner) = title.to_string();
    }
}
