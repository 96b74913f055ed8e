//! Session context shared by the HTTP client and the router
//!
//! `set_tokens`, `set_user`, `establish` and `clear` are the only methods
//! that write to the backing [`SessionStore`]. Each holds the state lock
//! across its persistence calls so memory and storage change together.

use crate::error::CoreResult;
use crate::storage::{
    ACCESS_TOKEN_COOKIE, CookieOptions, REFRESH_TOKEN_COOKIE, SessionStore, USER_KEY,
};
use crate::token;
use crate::types::{AuthTokens, Role, User};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory view of the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    pub is_loading: bool,
}

impl SessionState {
    /// A session is authenticated exactly when a user profile is set
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

/// Cloneable handle to the session. All clones share state.
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    store: Arc<dyn SessionStore>,
    cookie_options: CookieOptions,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cookie_options", &self.cookie_options)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an empty session over `store`
    pub fn new(store: Arc<dyn SessionStore>, cookie_options: CookieOptions) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            store,
            cookie_options,
        }
    }

    /// Create a session seeded with the tokens persisted in `store`.
    ///
    /// The stored profile is not trusted until it has been re-fetched, so
    /// the restored session starts unauthenticated.
    pub async fn restore(
        store: Arc<dyn SessionStore>,
        cookie_options: CookieOptions,
    ) -> CoreResult<Self> {
        let access_token = store.get_cookie(ACCESS_TOKEN_COOKIE).await?;
        let refresh_token = store.get_cookie(REFRESH_TOKEN_COOKIE).await?;
        tracing::debug!(
            has_access_token = access_token.is_some(),
            has_refresh_token = refresh_token.is_some(),
            "Restored session tokens"
        );

        let session = Self::new(store, cookie_options);
        {
            let mut state = session.state.write().await;
            state.access_token = access_token;
            state.refresh_token = refresh_token;
        }
        Ok(session)
    }

    pub fn cookie_options(&self) -> &CookieOptions {
        &self.cookie_options
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.refresh_token.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn set_loading(&self, is_loading: bool) {
        self.state.write().await.is_loading = is_loading;
    }

    /// Whether the access token is missing, undecodable or past its expiry
    pub async fn is_expired(&self) -> bool {
        match self.access_token().await {
            Some(token) => token::is_expired(&token),
            None => true,
        }
    }

    pub async fn user_role(&self) -> Option<Role> {
        self.state.read().await.role()
    }

    pub async fn is_admin(&self) -> bool {
        self.user_role().await == Some(Role::Admin)
    }

    pub async fn is_professional(&self) -> bool {
        self.user_role().await == Some(Role::Professional)
    }

    pub async fn is_user(&self) -> bool {
        self.user_role().await == Some(Role::User)
    }

    pub async fn user_name(&self) -> Option<String> {
        self.user().await.map(|user| user.username)
    }

    pub async fn user_email(&self) -> Option<String> {
        self.user().await.and_then(|user| user.email)
    }

    pub async fn is_verified(&self) -> bool {
        self.user().await.is_some_and(|user| user.is_verified)
    }

    /// Last profile written to local storage, if any and if it parses
    pub async fn cached_profile(&self) -> Option<User> {
        match self.store.get_item(USER_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read cached profile: {e}");
                None
            }
        }
    }

    /// Store a new token pair
    pub async fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> CoreResult<()> {
        let mut state = self.state.write().await;
        self.persist_tokens(access_token, refresh_token).await?;
        state.access_token = Some(access_token.to_string());
        state.refresh_token = refresh_token.map(str::to_string);
        Ok(())
    }

    /// Store the user profile, which marks the session authenticated
    pub async fn set_user(&self, user: User) -> CoreResult<()> {
        let mut state = self.state.write().await;
        self.persist_user(&user).await?;
        state.user = Some(user);
        Ok(())
    }

    /// Store tokens and user as one update
    pub async fn establish(&self, tokens: AuthTokens, user: User) -> CoreResult<()> {
        let mut state = self.state.write().await;
        self.persist_tokens(&tokens.access_token, tokens.refresh_token.as_deref())
            .await?;
        self.persist_user(&user).await?;
        state.access_token = Some(tokens.access_token);
        state.refresh_token = tokens.refresh_token;
        state.user = Some(user);
        Ok(())
    }

    /// Drop tokens and user from memory and storage.
    ///
    /// Memory is always cleared; storage failures are logged.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.access_token = None;
        state.refresh_token = None;
        state.user = None;

        for cookie in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            if let Err(e) = self.store.remove_cookie(cookie).await {
                tracing::error!("Failed to remove cookie {cookie}: {e}");
            }
        }
        if let Err(e) = self.store.remove_item(USER_KEY).await {
            tracing::error!("Failed to remove cached profile: {e}");
        }
    }

    async fn persist_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> CoreResult<()> {
        self.store
            .set_cookie(ACCESS_TOKEN_COOKIE, access_token, &self.cookie_options)
            .await?;
        match refresh_token {
            Some(refresh) => {
                self.store
                    .set_cookie(REFRESH_TOKEN_COOKIE, refresh, &self.cookie_options)
                    .await
            }
            None => self.store.remove_cookie(REFRESH_TOKEN_COOKIE).await,
        }
    }

    async fn persist_user(&self, user: &User) -> CoreResult<()> {
        let serialized = serde_json::to_string(user)?;
        self.store.set_item(USER_KEY, &serialized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::{fresh_token, sample_user, stale_token};

    fn memory_session() -> (Session, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Session::new(store.clone(), CookieOptions::default()), store)
    }

    #[tokio::test]
    async fn test_new_session_is_unauthenticated_and_expired() {
        let (session, _) = memory_session();
        assert!(!session.is_authenticated().await);
        assert!(session.is_expired().await);
        assert_eq!(session.user_role().await, None);
    }

    #[tokio::test]
    async fn test_establish_persists_pair() {
        let (session, store) = memory_session();
        let user = sample_user(Role::Professional);
        session
            .establish(
                AuthTokens {
                    access_token: fresh_token(),
                    refresh_token: Some("r1".into()),
                },
                user.clone(),
            )
            .await
            .unwrap();

        assert!(session.is_authenticated().await);
        assert!(session.is_professional().await);
        assert!(!session.is_expired().await);
        assert_eq!(store.get_cookie(REFRESH_TOKEN_COOKIE).await.unwrap().as_deref(), Some("r1"));
        assert_eq!(session.cached_profile().await, Some(user));
    }

    #[tokio::test]
    async fn test_tokens_alone_do_not_authenticate() {
        let (session, _) = memory_session();
        session.set_tokens(&fresh_token(), None).await.unwrap();
        assert!(!session.is_authenticated().await);
        assert!(!session.is_expired().await);
    }

    #[tokio::test]
    async fn test_clear_wipes_memory_and_storage() {
        let (session, store) = memory_session();
        session.set_tokens(&stale_token(), Some("r")).await.unwrap();
        session.set_user(sample_user(Role::Admin)).await.unwrap();

        session.clear().await;

        assert_eq!(session.snapshot().await, SessionState::default());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_restore_loads_tokens_but_not_user() {
        let store = Arc::new(MemoryStore::new());
        {
            let session = Session::new(store.clone(), CookieOptions::default());
            session
                .establish(
                    AuthTokens {
                        access_token: "a".into(),
                        refresh_token: Some("r".into()),
                    },
                    sample_user(Role::User),
                )
                .await
                .unwrap();
        }

        let restored = Session::restore(store, CookieOptions::default()).await.unwrap();
        assert_eq!(restored.access_token().await.as_deref(), Some("a"));
        assert_eq!(restored.refresh_token().await.as_deref(), Some("r"));
        assert!(!restored.is_authenticated().await);
        assert!(restored.cached_profile().await.is_some());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let (session, _) = memory_session();
        let other = session.clone();
        other.set_user(sample_user(Role::User)).await.unwrap();
        assert!(session.is_user().await);
        assert_eq!(session.user_name().await.as_deref(), Some("test-user"));
        assert_eq!(session.user_email().await.as_deref(), Some("user@example.com"));
        assert!(session.is_verified().await);
    }
}
