#![allow(dead_code)]

use counsel_core::{
    ClientConfig, CookieOptions, Location, MemoryStore, Navigator, RateLimitConfig, Session,
};
use counsel_http::ApiClient;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// Navigator that remembers every forced navigation
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Location>>,
    titles: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<Location> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: Location) {
        self.visits.lock().unwrap().push(location);
    }

    fn set_title(&self, title: &str) {
        self.titles.lock().unwrap().push(title.to_string());
    }
}

pub struct Harness {
    pub client: ApiClient,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn session(&self) -> &Session {
        self.client.session()
    }
}

pub fn harness(server: &MockServer) -> Harness {
    harness_with_limit(server, RateLimitConfig::default())
}

pub fn harness_with_limit(server: &MockServer, rate_limit: RateLimitConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let session = Session::new(store.clone(), CookieOptions::default());

    let config = ClientConfig {
        base_url: server.uri(),
        rate_limit,
        ..ClientConfig::default()
    };
    let client = counsel_http::ApiClientBuilder::from_config(&config)
        .session(session)
        .navigator(navigator.clone())
        .build()
        .unwrap();

    Harness {
        client,
        store,
        navigator,
    }
}

pub fn user_json(role: &str) -> Value {
    json!({
        "id": "u-1",
        "username": "zhang",
        "email": "zhang@example.com",
        "role": role,
        "is_verified": true,
    })
}
