//! Persisted session storage
//!
//! Mirrors the two browser stores the session lives in: a cookie jar for
//! tokens and a key/value "local storage" for the non-sensitive profile.

use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Cookie holding the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie holding the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
/// Local-storage key holding the serialized user profile
pub const USER_KEY: &str = "user_info";

/// `SameSite` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// Attributes applied when a cookie is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
    /// Lifetime in days
    pub expires_days: i64,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Strict,
            expires_days: 7,
        }
    }
}

/// A cookie as persisted, with its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub secure: bool,
    pub same_site: SameSite,
}

impl StoredCookie {
    fn new(value: &str, options: &CookieOptions) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Utc::now() + Duration::days(options.expires_days),
            secure: options.secure,
            same_site: options.same_site,
        }
    }

    fn is_live(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Backing store for session state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a cookie value. Expired cookies read as absent.
    async fn get_cookie(&self, name: &str) -> CoreResult<Option<String>>;
    async fn set_cookie(&self, name: &str, value: &str, options: &CookieOptions)
    -> CoreResult<()>;
    async fn remove_cookie(&self, name: &str) -> CoreResult<()>;

    async fn get_item(&self, key: &str) -> CoreResult<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> CoreResult<()>;
    async fn remove_item(&self, key: &str) -> CoreResult<()>;
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreContents {
    cookies: HashMap<String, StoredCookie>,
    items: HashMap<String, String>,
}

/// In-memory store, used for tests and sessions that should not outlive the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<StoreContents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw cookie record, including attributes
    pub async fn cookie(&self, name: &str) -> Option<StoredCookie> {
        self.contents.lock().await.cookies.get(name).cloned()
    }

    /// Whether no cookie and no item is stored
    pub async fn is_empty(&self) -> bool {
        let contents = self.contents.lock().await;
        contents.cookies.is_empty() && contents.items.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_cookie(&self, name: &str) -> CoreResult<Option<String>> {
        let contents = self.contents.lock().await;
        Ok(contents
            .cookies
            .get(name)
            .filter(|cookie| cookie.is_live())
            .map(|cookie| cookie.value.clone()))
    }

    async fn set_cookie(
        &self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> CoreResult<()> {
        self.contents
            .lock()
            .await
            .cookies
            .insert(name.to_string(), StoredCookie::new(value, options));
        Ok(())
    }

    async fn remove_cookie(&self, name: &str) -> CoreResult<()> {
        self.contents.lock().await.cookies.remove(name);
        Ok(())
    }

    async fn get_item(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.contents.lock().await.items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> CoreResult<()> {
        self.contents
            .lock()
            .await
            .items
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> CoreResult<()> {
        self.contents.lock().await.items.remove(key);
        Ok(())
    }
}

/// File-backed store: `cookies.json` and `local_storage.json` in a directory
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    const COOKIE_FILE: &'static str = "cookies.json";
    const ITEM_FILE: &'static str = "local_storage.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_map<T>(&self, file: &str) -> CoreResult<HashMap<String, T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let path = self.dir.join(file);
        match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(CoreError::storage_error(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn write_map<T: Serialize>(&self, file: &str, map: &HashMap<String, T>) -> CoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file);
        let content = serde_json::to_vec_pretty(map)?;
        tokio::fs::write(&path, content).await.map_err(|e| {
            CoreError::storage_error(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn get_cookie(&self, name: &str) -> CoreResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let cookies = self.read_map::<StoredCookie>(Self::COOKIE_FILE).await?;
        Ok(cookies
            .get(name)
            .filter(|cookie| cookie.is_live())
            .map(|cookie| cookie.value.clone()))
    }

    async fn set_cookie(
        &self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> CoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut cookies = self.read_map::<StoredCookie>(Self::COOKIE_FILE).await?;
        cookies.retain(|_, cookie| cookie.is_live());
        cookies.insert(name.to_string(), StoredCookie::new(value, options));
        self.write_map(Self::COOKIE_FILE, &cookies).await
    }

    async fn remove_cookie(&self, name: &str) -> CoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut cookies = self.read_map::<StoredCookie>(Self::COOKIE_FILE).await?;
        if cookies.remove(name).is_some() {
            self.write_map(Self::COOKIE_FILE, &cookies).await?;
        }
        Ok(())
    }

    async fn get_item(&self, key: &str) -> CoreResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let items = self.read_map::<String>(Self::ITEM_FILE).await?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> CoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_map::<String>(Self::ITEM_FILE).await?;
        items.insert(key.to_string(), value.to_string());
        self.write_map(Self::ITEM_FILE, &items).await
    }

    async fn remove_item(&self, key: &str) -> CoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_map::<String>(Self::ITEM_FILE).await?;
        if items.remove(key).is_some() {
            self.write_map(Self::ITEM_FILE, &items).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_cookie_attributes() {
        let store = MemoryStore::new();
        store
            .set_cookie(ACCESS_TOKEN_COOKIE, "abc", &CookieOptions::default())
            .await
            .unwrap();

        let cookie = store.cookie(ACCESS_TOKEN_COOKIE).await.unwrap();
        assert!(cookie.secure);
        assert_eq!(cookie.same_site, SameSite::Strict);
        let lifetime = cookie.expires_at - Utc::now();
        assert!(lifetime > Duration::days(6) && lifetime <= Duration::days(7));
    }

    #[tokio::test]
    async fn test_expired_cookie_reads_as_absent() {
        let store = MemoryStore::new();
        let options = CookieOptions {
            expires_days: -1,
            ..CookieOptions::default()
        };
        store.set_cookie("stale", "x", &options).await.unwrap();
        assert_eq!(store.get_cookie("stale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_items() {
        let store = MemoryStore::new();
        store.set_item(USER_KEY, "{}").await.unwrap();
        assert_eq!(store.get_item(USER_KEY).await.unwrap().as_deref(), Some("{}"));
        store.remove_item(USER_KEY).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");

        let store = FileStore::new(&path);
        store
            .set_cookie(REFRESH_TOKEN_COOKIE, "refresh", &CookieOptions::default())
            .await
            .unwrap();
        store.set_item(USER_KEY, r#"{"id":"1"}"#).await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get_cookie(REFRESH_TOKEN_COOKIE).await.unwrap().as_deref(),
            Some("refresh")
        );
        assert_eq!(
            reopened.get_item(USER_KEY).await.unwrap().as_deref(),
            Some(r#"{"id":"1"}"#)
        );

        reopened.remove_cookie(REFRESH_TOKEN_COOKIE).await.unwrap();
        reopened.remove_item(USER_KEY).await.unwrap();
        assert_eq!(store.get_cookie(REFRESH_TOKEN_COOKIE).await.unwrap(), None);
        assert_eq!(store.get_item(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_missing_dir_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("does-not-exist"));
        assert_eq!(store.get_cookie(ACCESS_TOKEN_COOKIE).await.unwrap(), None);
        assert_eq!(store.get_item(USER_KEY).await.unwrap(), None);
    }
}
