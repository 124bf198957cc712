//! Client-side navigation: a navigator seam, an in-memory implementation,
//! and a router that runs the authentication guard before committing a
//! transition.

pub mod guard;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::session::SessionManager;
use guard::{GuardDecision, RouteGuard};

/// Landing page after successful authentication.
pub const LANDING_PATH: &str = "/";
/// Login screen; also the redirect target for guarded routes.
pub const LOGIN_PATH: &str = "/auth/login";
/// Path prefix of the authentication section.
pub const AUTH_PREFIX: &str = "/auth";

/// Where navigation lands. The session manager drives this after login and
/// logout; an application shell renders whatever path is current.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
    fn current_path(&self) -> String;
}

struct NavState {
    current: String,
    history: Vec<String>,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            current: LANDING_PATH.to_string(),
            history: Vec::new(),
        }
    }
}

/// In-memory navigator tracking the current path and transition history.
#[derive(Default)]
pub struct MemoryNavigator {
    state: RwLock<NavState>,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every committed transition, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state.read().history.clone()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, path: &str) {
        let mut state = self.state.write();
        debug!(from = %state.current, to = path, "navigating");
        state.current = path.to_string();
        state.history.push(path.to_string());
    }

    fn current_path(&self) -> String {
        self.state.read().current.clone()
    }
}

/// Router: every `push` runs the route guard before the transition commits.
pub struct Router {
    guard: RouteGuard,
    nav: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(session: Arc<SessionManager>, nav: Arc<dyn Navigator>) -> Self {
        Self {
            guard: RouteGuard::new(session),
            nav,
        }
    }

    /// Navigate to `to`, or to wherever the guard redirects instead. The
    /// transition does not commit until the guard has reconciled session
    /// state and decided.
    pub async fn push(&self, to: &str) -> GuardDecision {
        let decision = self.guard.decide(to).await;
        match &decision {
            GuardDecision::Allow => self.nav.navigate(to),
            GuardDecision::Redirect(target) => self.nav.navigate(target),
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_navigator_tracks_current_and_history() {
        let nav = MemoryNavigator::new();
        assert_eq!(nav.current_path(), "/");
        assert!(nav.history().is_empty());

        nav.navigate("/records");
        nav.navigate("/profile");

        assert_eq!(nav.current_path(), "/profile");
        assert_eq!(
            nav.history(),
            vec!["/records".to_string(), "/profile".to_string()]
        );
    }
}
