//! Pre-navigation authentication guard.
//!
//! Anonymous visitors headed anywhere outside the auth section are sent to
//! the login screen, carrying the original target and a section-specific
//! reason so the login page can explain the redirect and return them
//! afterwards. Logged-in users are kept out of the auth section.

use std::sync::Arc;

use url::form_urlencoded;

use super::{AUTH_PREFIX, LANDING_PATH, LOGIN_PATH};
use crate::session::SessionManager;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Section of the app a guarded path belongs to; selects the message shown
/// on the login screen after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectSection {
    Default,
    Profile,
    Records,
    Settings,
}

impl RedirectSection {
    pub fn for_path(path: &str) -> Self {
        if path.starts_with("/profile") {
            RedirectSection::Profile
        } else if path.starts_with("/records") {
            RedirectSection::Records
        } else if path.starts_with("/settings") {
            RedirectSection::Settings
        } else {
            RedirectSection::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectSection::Default => "default",
            RedirectSection::Profile => "profile",
            RedirectSection::Records => "records",
            RedirectSection::Settings => "settings",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RedirectSection::Default => "Please log in to continue",
            RedirectSection::Profile => "Please log in to view your profile",
            RedirectSection::Records => "Please log in to manage your records",
            RedirectSection::Settings => "Please log in to change settings",
        }
    }
}

pub struct RouteGuard {
    session: Arc<SessionManager>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Decide what should happen to a navigation towards `to`. Session state
    /// is reconciled first; the caller must not commit the transition until
    /// this returns.
    pub async fn decide(&self, to: &str) -> GuardDecision {
        self.session.check_auth().await;

        let logged_in = self.session.is_logged_in();
        let in_auth_section = to.starts_with(AUTH_PREFIX);

        if !logged_in && !in_auth_section {
            return GuardDecision::Redirect(login_redirect(to));
        }
        if logged_in && in_auth_section {
            return GuardDecision::Redirect(LANDING_PATH.to_string());
        }
        GuardDecision::Allow
    }
}

/// Build the login path carrying the original target, a human-readable
/// reason and the section marker, all URL-encoded.
fn login_redirect(to: &str) -> String {
    let section = RedirectSection::for_path(to);
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", to)
        .append_pair("message", section.message())
        .append_pair("type", section.as_str())
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpClient;
    use crate::config::ApiConfig;
    use crate::notify::NotificationBus;
    use crate::router::{MemoryNavigator, Navigator, Router};
    use crate::session::token::TokenStore;
    use crate::session::LoginRequest;
    use axum::routing::{get, post};
    use axum::{Json, Router as AxumRouter};
    use serde_json::json;

    fn anonymous_session() -> Arc<SessionManager> {
        let config = ApiConfig {
            // Never reached: an anonymous session has no token to reconcile.
            base_url: "http://127.0.0.1:9/api".to_string(),
        };
        let token = TokenStore::in_memory(7);
        let notify = NotificationBus::new();
        let client = HttpClient::new(&config, token.clone(), notify);
        let nav: Arc<dyn Navigator> = Arc::new(MemoryNavigator::new());
        Arc::new(SessionManager::new(client, token, nav))
    }

    async fn authenticated_session() -> Arc<SessionManager> {
        let app = AxumRouter::new()
            .route(
                "/api/auth/login",
                post(|| async {
                    Json(json!({
                        "code": 200,
                        "message": "success",
                        "data": {"token": "abc", "user": {
                            "id": "u1",
                            "email": "ada@example.com",
                            "name": "Ada",
                            "avatar": "",
                            "isActive": true,
                            "createdAt": "2024-01-01T00:00:00Z",
                            "updatedAt": "2024-01-01T00:00:00Z",
                            "lastLoginAt": null
                        }}
                    }))
                }),
            )
            .route(
                "/api/auth/me",
                get(|| async { Json(json!({"code": 200, "message": "success", "data": null})) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ApiConfig {
            base_url: format!("http://{addr}/api"),
        };
        let token = TokenStore::in_memory(7);
        let notify = NotificationBus::new();
        let client = HttpClient::new(&config, token.clone(), notify);
        let nav: Arc<dyn Navigator> = Arc::new(MemoryNavigator::new());
        let session = Arc::new(SessionManager::new(client, token, nav));
        session
            .login(&LoginRequest {
                email: "ada@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        session
    }

    #[test]
    fn section_matching_by_path_prefix() {
        assert_eq!(
            RedirectSection::for_path("/records/123"),
            RedirectSection::Records
        );
        assert_eq!(
            RedirectSection::for_path("/profile"),
            RedirectSection::Profile
        );
        assert_eq!(
            RedirectSection::for_path("/settings/theme"),
            RedirectSection::Settings
        );
        assert_eq!(
            RedirectSection::for_path("/dashboard"),
            RedirectSection::Default
        );
    }

    #[tokio::test]
    async fn anonymous_visitor_is_redirected_with_context() {
        let guard = RouteGuard::new(anonymous_session());

        let decision = guard.decide("/records/123").await;
        assert_eq!(
            decision,
            GuardDecision::Redirect(
                "/auth/login?redirect=%2Frecords%2F123\
                 &message=Please+log+in+to+manage+your+records&type=records"
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn anonymous_visitor_may_enter_auth_section() {
        let guard = RouteGuard::new(anonymous_session());
        assert_eq!(guard.decide("/auth/login").await, GuardDecision::Allow);
        assert_eq!(guard.decide("/auth/register").await, GuardDecision::Allow);
    }

    #[tokio::test]
    async fn authenticated_visitor_is_kept_out_of_auth_section() {
        let guard = RouteGuard::new(authenticated_session().await);
        assert_eq!(
            guard.decide("/auth/login").await,
            GuardDecision::Redirect("/".to_string())
        );
    }

    #[tokio::test]
    async fn authenticated_visitor_passes_through() {
        let guard = RouteGuard::new(authenticated_session().await);
        assert_eq!(guard.decide("/records").await, GuardDecision::Allow);
        assert_eq!(guard.decide("/settings").await, GuardDecision::Allow);
    }

    #[tokio::test]
    async fn router_commits_the_redirect_target() {
        let nav = Arc::new(MemoryNavigator::new());
        let nav_dyn: Arc<dyn Navigator> = nav.clone();
        let router = Router::new(anonymous_session(), nav_dyn);

        let decision = router.push("/records/123").await;
        assert!(matches!(decision, GuardDecision::Redirect(_)));
        assert!(nav.current_path().starts_with("/auth/login?"));
        assert_eq!(nav.history().len(), 1);
    }

    #[tokio::test]
    async fn router_commits_allowed_navigation_unchanged() {
        let nav = Arc::new(MemoryNavigator::new());
        let nav_dyn: Arc<dyn Navigator> = nav.clone();
        let router = Router::new(anonymous_session(), nav_dyn);

        let decision = router.push("/auth/register").await;
        assert_eq!(decision, GuardDecision::Allow);
        assert_eq!(nav.current_path(), "/auth/register");
    }
}
