//! Session lifecycle: login, register, logout, profile refresh.
//!
//! The manager owns the bearer token (through [`TokenStore`]) and the cached
//! user profile. `is_logged_in` is derived from token presence alone; the
//! profile is replaced wholesale on fetch and may lag the token briefly while
//! a refresh is in flight.

pub mod preferences;
pub mod token;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{HttpClient, Result};
use crate::router::{Navigator, LANDING_PATH, LOGIN_PATH};
use token::TokenStore;

/// Authenticated user profile. Replaced wholesale, never patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct AuthPayload {
    token: String,
    user: User,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    token: String,
}

pub struct SessionManager {
    client: HttpClient,
    token: TokenStore,
    nav: Arc<dyn Navigator>,
    user: RwLock<Option<User>>,
    authenticating: AtomicBool,
}

impl SessionManager {
    pub fn new(client: HttpClient, token: TokenStore, nav: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            token,
            nav,
            user: RwLock::new(None),
            authenticating: AtomicBool::new(false),
        }
    }

    /// True iff a live token is stored. Evaluated on every navigation, so it
    /// must stay cheap; the cached profile is deliberately not consulted.
    pub fn is_logged_in(&self) -> bool {
        self.token.is_set()
    }

    /// A login or register call is currently in flight.
    pub fn is_authenticating(&self) -> bool {
        self.authenticating.load(Ordering::SeqCst)
    }

    /// Cached user profile, if one has been fetched.
    pub fn user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// Authenticate with email and password. On success the token and user
    /// are stored and the app navigates to the landing page; on failure the
    /// session stays anonymous and the error propagates to the caller.
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        self.authenticate("/auth/login", request).await
    }

    /// Create an account. Behaves like [`login`](Self::login) on both
    /// success and failure.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        self.authenticate("/auth/register", request).await
    }

    async fn authenticate<B: Serialize>(&self, endpoint: &str, request: &B) -> Result<User> {
        self.authenticating.store(true, Ordering::SeqCst);
        let result = self.client.post::<B, AuthPayload>(endpoint, request).await;
        self.authenticating.store(false, Ordering::SeqCst);

        let payload = result?;
        self.token.set(payload.token);
        *self.user.write() = Some(payload.user.clone());
        self.nav.navigate(LANDING_PATH);
        Ok(payload.user)
    }

    /// End the session. The remote call is best-effort: local state is
    /// cleared and the app navigates to the login screen even when the
    /// backend is unreachable, so the user can always log out.
    pub async fn logout(&self) {
        if let Err(e) = self.client.post_empty::<()>("/auth/logout").await {
            warn!(error = %e, "logout request failed, clearing local session anyway");
        }
        self.token.clear();
        *self.user.write() = None;
        self.nav.navigate(LOGIN_PATH);
    }

    /// Refresh the cached profile from `GET /auth/me`. Any failure drops the
    /// token, since it is presumed invalid.
    pub async fn fetch_user(&self) {
        if !self.token.is_set() {
            return;
        }
        match self.client.get::<User>("/auth/me").await {
            Ok(user) => {
                *self.user.write() = Some(user);
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch user profile, dropping session token");
                self.token.clear();
            }
        }
    }

    /// Reconcile local state against the server. Idempotent and infallible:
    /// invoked at startup and before every guarded navigation.
    pub async fn check_auth(&self) {
        let needs_fetch = self.token.is_set() && self.user.read().is_none();
        if needs_fetch {
            self.fetch_user().await;
        }
    }

    /// Exchange the current token for a fresh one. A failed refresh performs
    /// a full logout and returns false.
    pub async fn refresh_token(&self) -> bool {
        match self.client.post_empty::<TokenPayload>("/auth/refresh").await {
            Ok(payload) => {
                debug!("session token refreshed");
                self.token.set(payload.token);
                true
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, logging out");
                self.logout().await;
                false
            }
        }
    }
}
