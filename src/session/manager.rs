//! Session lifecycle manager.
//!
//! Single source of truth for "who is logged in and with what credential".
//! The manager owns the durable token store and keeps expiry handling out of
//! the rest of the application: whenever the session exposes a user, callers
//! may assume the accompanying token was valid at hydration time.
//!
//! Failure policy: decode errors, network errors and server rejections never
//! escape these operations. Initialization failures leave a fully empty
//! session; a failed background snapshot refresh leaves the previous state
//! untouched.

use std::cell::Cell;

use chrono::{TimeDelta, Utc};
use log::{debug, warn};
use tokio::sync::watch;

use crate::models::user::User;
use crate::services::ImplBookingApi;
use crate::session::store::ImplTokenStore;
use crate::session::token;

/// Client-local authentication state. Always a cache of server-asserted
/// truth; it has no persistence of its own beyond the stored token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    /// Whether initialization or a refresh is in progress
    pub loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Owns the session state with exclusive-writer semantics. Consumers read
/// through [current](Self::current) or [subscribe](Self::subscribe); only the
/// operations below mutate.
pub struct SessionManager {
    store: ImplTokenStore,
    api: ImplBookingApi,
    refresh_lifetime: TimeDelta,
    state: watch::Sender<Session>,
    /// Monotonically increasing request generation. A fetched snapshot is
    /// applied only if no newer mutating operation started in the meantime.
    generation: Cell<u64>,
}

impl SessionManager {
    pub fn new(store: ImplTokenStore, api: ImplBookingApi, refresh_lifetime: TimeDelta) -> Self {
        let (state, _) = watch::channel(Session::default());

        Self {
            store,
            api,
            refresh_lifetime,
            state,
            generation: Cell::new(0),
        }
    }

    /// Snapshot of the current session state
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Watch receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Hydrates the session from the durable store.
    ///
    /// A stored access-valid token is adopted directly; an expired token that
    /// is still inside the refresh window gets exactly one refresh attempt.
    /// Any failure on this path clears everything: after this call the
    /// session is fully populated or fully empty, never in between.
    pub async fn initialize(&self) {
        self.bump_generation();
        self.set(Session {
            loading: true,
            ..Session::default()
        });

        let Some(stored) = self.store.load() else {
            self.set(Session::default());
            return;
        };

        let now = Utc::now();
        let adopted = if token::is_access_valid(&stored, now) {
            Some(stored)
        } else if token::is_refresh_valid(&stored, self.refresh_lifetime, now) {
            match self.api.refresh(&stored).await {
                Ok(fresh) => {
                    // the replaced token must never be used again
                    self.store.save(&fresh);
                    Some(fresh)
                }
                Err(err) => {
                    warn!("token refresh during initialization rejected: {err:#}");
                    None
                }
            }
        } else {
            None
        };

        let Some(adopted) = adopted else {
            self.store.clear();
            self.set(Session::default());
            return;
        };

        if self.refresh_user(Some(&adopted)).await.is_err() {
            self.store.clear();
            self.set(Session::default());
        }
    }

    /// Adopts a freshly issued token.
    ///
    /// The token is persisted synchronously before anything else, so a reload
    /// mid-flow cannot lose the credential. A minimal claims-derived identity
    /// is exposed immediately; the authoritative snapshot replaces it once
    /// `/users/myInfo` answers (a fetch failure keeps the minimal identity).
    pub async fn login(&self, fresh_token: &str) {
        self.bump_generation();
        self.store.save(fresh_token);

        let claims = match token::decode_claims(fresh_token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!("freshly issued token failed to decode: {err:#}");
                self.store.clear();
                self.set(Session::default());
                return;
            }
        };

        self.set(Session {
            token: Some(fresh_token.to_string()),
            user: Some(User::from_claims(&claims)),
            loading: false,
        });

        let _ = self.refresh_user(None).await;
    }

    /// Retires the session. The server-side logout is best effort; local
    /// state and durable storage are cleared unconditionally.
    pub async fn logout(&self) {
        self.bump_generation();

        // a manager fresh off a request has no in-memory token yet
        if let Some(current_token) = self.current().token.or_else(|| self.store.load()) {
            if let Err(err) = self.api.logout(&current_token).await {
                warn!("server-side logout failed, clearing local session anyway: {err:#}");
            }
        }

        self.store.clear();
        self.set(Session::default());
    }

    /// Replaces the in-memory user snapshot with the authoritative one.
    ///
    /// `token_override` is used during initialization, before the token is
    /// committed to the session state. Without a token this is a no-op. On
    /// failure the previous snapshot stays untouched; the error is returned
    /// so `initialize` can distinguish, callers elsewhere just log-and-drop.
    pub async fn refresh_user(&self, token_override: Option<&str>) -> anyhow::Result<()> {
        let session_token = match token_override {
            Some(explicit) => explicit.to_string(),
            None => match self.current().token {
                Some(current) => current,
                None => return Ok(()),
            },
        };

        let generation = self.bump_generation();

        match self.api.my_info(&session_token).await {
            Ok(user) => {
                if self.generation.get() != generation {
                    debug!("dropping stale user snapshot (generation {generation})");
                    return Ok(());
                }

                self.set(Session {
                    token: Some(session_token),
                    user: Some(user),
                    loading: false,
                });
                Ok(())
            }
            Err(err) => {
                warn!("user snapshot refresh failed, keeping previous state: {err:#}");
                Err(err)
            }
        }
    }

    fn set(&self, session: Session) {
        self.state.send_replace(session);
    }

    fn bump_generation(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockBookingApi;
    use crate::session::store::{MemoryTokenStore, MockTokenStore, TokenStore};
    use crate::session::token::test_tokens::make_token;
    use mockall::Sequence;
    use std::sync::Arc;

    const REFRESH_LIFETIME: TimeDelta = TimeDelta::days(7);

    fn manager_with(store: MemoryTokenStore, api: MockBookingApi) -> SessionManager {
        SessionManager::new(Box::new(store), Arc::new(api), REFRESH_LIFETIME)
    }

    fn snapshot_user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            enabled: true,
            bookings: vec![],
        }
    }

    #[ntex::test]
    async fn test_initialize_without_stored_token_leaves_session_empty() {
        let manager = manager_with(MemoryTokenStore::default(), MockBookingApi::new());

        manager.initialize().await;

        let session = manager.current();
        assert!(session.token.is_none());
        assert!(session.user.is_none());
        assert!(!session.loading);
    }

    #[ntex::test]
    async fn test_login_persists_token_and_reload_restores_the_same_user() {
        let store = MemoryTokenStore::default();
        let session_token = make_token("ana@example.com", 9, -10, 3600);

        let mut api = MockBookingApi::new();
        api.expect_my_info()
            .times(1)
            .returning(|_| Ok(snapshot_user(9, "ana@example.com")));
        let manager = manager_with(store.clone(), api);

        manager.login(&session_token).await;

        assert_eq!(store.load().as_deref(), Some(session_token.as_str()));
        assert_eq!(manager.current().user.map(|u| u.id), Some(9));

        // simulate a page reload: a fresh manager over the same storage
        let mut api = MockBookingApi::new();
        api.expect_my_info()
            .times(1)
            .returning(|_| Ok(snapshot_user(9, "ana@example.com")));
        let reloaded = manager_with(store.clone(), api);

        reloaded.initialize().await;

        let session = reloaded.current();
        assert_eq!(session.user.map(|u| u.id), Some(9));
        assert_eq!(session.token.as_deref(), Some(session_token.as_str()));
        assert!(!session.loading);
    }

    #[ntex::test]
    async fn test_login_persists_the_token_before_fetching_the_snapshot() {
        let session_token = make_token("ana@example.com", 9, -10, 3600);
        let expected = session_token.clone();

        let mut seq = Sequence::new();
        let mut store = MockTokenStore::new();
        store
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .withf(move |t| t == expected)
            .returning(|_| ());
        let mut api = MockBookingApi::new();
        api.expect_my_info()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(snapshot_user(9, "ana@example.com")));

        let manager = SessionManager::new(Box::new(store), Arc::new(api), REFRESH_LIFETIME);
        manager.login(&session_token).await;

        assert!(manager.current().is_authenticated());
    }

    #[ntex::test]
    async fn test_login_exposes_claims_identity_when_snapshot_fetch_fails() {
        let store = MemoryTokenStore::default();
        let session_token = make_token("ana@example.com", 9, -10, 3600);

        let mut api = MockBookingApi::new();
        api.expect_my_info()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("network down")));
        let manager = manager_with(store.clone(), api);

        manager.login(&session_token).await;

        let user = manager.current().user.expect("minimal identity expected");
        assert_eq!(user.id, 9);
        assert_eq!(user.username, "ana@example.com");
        assert!(user.bookings.is_empty());
        assert_eq!(store.load().as_deref(), Some(session_token.as_str()));
    }

    #[ntex::test]
    async fn test_login_with_undecodable_token_fails_closed() {
        let store = MemoryTokenStore::default();
        let manager = manager_with(store.clone(), MockBookingApi::new());

        manager.login("not-a-token").await;

        assert!(store.load().is_none());
        assert!(manager.current().user.is_none());
    }

    #[ntex::test]
    async fn test_logout_clears_local_state_even_if_remote_call_fails() {
        let store = MemoryTokenStore::default();
        let session_token = make_token("ana@example.com", 9, -10, 3600);

        let mut api = MockBookingApi::new();
        api.expect_my_info()
            .times(1)
            .returning(|_| Ok(snapshot_user(9, "ana@example.com")));
        api.expect_logout()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection reset")));
        let manager = manager_with(store.clone(), api);

        manager.login(&session_token).await;
        manager.logout().await;

        assert!(store.load().is_none());
        let session = manager.current();
        assert!(session.token.is_none());
        assert!(session.user.is_none());
    }

    #[ntex::test]
    async fn test_refresh_user_failure_keeps_previous_snapshot() {
        let store = MemoryTokenStore::default();
        let session_token = make_token("ana@example.com", 9, -10, 3600);

        let mut seq = Sequence::new();
        let mut api = MockBookingApi::new();
        api.expect_my_info()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(snapshot_user(9, "ana@example.com")));
        api.expect_my_info()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(anyhow::anyhow!("HTTP 500")));
        let manager = manager_with(store.clone(), api);

        manager.login(&session_token).await;
        let result = manager.refresh_user(None).await;

        assert!(result.is_err());
        let session = manager.current();
        assert_eq!(session.user.map(|u| u.id), Some(9));
        assert_eq!(session.token.as_deref(), Some(session_token.as_str()));
    }

    #[ntex::test]
    async fn test_refresh_user_without_token_is_a_noop() {
        let manager = manager_with(MemoryTokenStore::default(), MockBookingApi::new());

        assert!(manager.refresh_user(None).await.is_ok());
        assert!(manager.current().user.is_none());
    }

    #[ntex::test]
    async fn test_initialize_exchanges_expired_token_inside_refresh_window() {
        let store = MemoryTokenStore::default();
        let expired = make_token("ana@example.com", 9, -3600, -1);
        let fresh = make_token("ana@example.com", 9, 0, 3600);
        store.save(&expired);

        let expected_stale = expired.clone();
        let issued = fresh.clone();
        let mut api = MockBookingApi::new();
        api.expect_refresh()
            .times(1)
            .withf(move |t| t == expected_stale)
            .returning(move |_| Ok(issued.clone()));
        api.expect_my_info()
            .times(1)
            .returning(|_| Ok(snapshot_user(9, "ana@example.com")));
        let manager = manager_with(store.clone(), api);

        manager.initialize().await;

        let session = manager.current();
        assert_eq!(session.user.map(|u| u.id), Some(9));
        assert_eq!(session.token.as_deref(), Some(fresh.as_str()));
        assert_eq!(store.load().as_deref(), Some(fresh.as_str()));
        assert!(!session.loading);
    }

    #[ntex::test]
    async fn test_initialize_clears_everything_when_refresh_is_rejected() {
        let store = MemoryTokenStore::default();
        store.save(&make_token("ana@example.com", 9, -3600, -1));

        let mut api = MockBookingApi::new();
        api.expect_refresh()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("Token refresh rejected (status 401)")));
        let manager = manager_with(store.clone(), api);

        manager.initialize().await;

        assert!(store.load().is_none());
        let session = manager.current();
        assert!(session.token.is_none());
        assert!(session.user.is_none());
        assert!(!session.loading);
    }

    #[ntex::test]
    async fn test_initialize_clears_token_outside_both_validity_windows() {
        let store = MemoryTokenStore::default();
        let long_dead = make_token(
            "ana@example.com",
            9,
            -TimeDelta::days(30).num_seconds(),
            -TimeDelta::days(29).num_seconds(),
        );
        store.save(&long_dead);

        // no refresh expectation: the call must not even be attempted
        let manager = manager_with(store.clone(), MockBookingApi::new());

        manager.initialize().await;

        assert!(store.load().is_none());
        assert!(manager.current().user.is_none());
    }

    #[ntex::test]
    async fn test_subscribers_observe_the_login_transition() {
        let session_token = make_token("ana@example.com", 9, -10, 3600);

        let mut api = MockBookingApi::new();
        api.expect_my_info()
            .times(1)
            .returning(|_| Ok(snapshot_user(9, "ana@example.com")));
        let manager = manager_with(MemoryTokenStore::default(), api);

        let receiver = manager.subscribe();
        assert!(receiver.borrow().user.is_none());

        manager.login(&session_token).await;

        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow().user.as_ref().map(|u| u.id), Some(9));
    }
}
