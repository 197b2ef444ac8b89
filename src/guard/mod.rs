// guard/mod.rs - Route guard over the auth state
//
// Protected routes wait for the bootstrap to finish loading, bounded by a
// configurable cutoff, then render or redirect to the login page.

pub mod routes;

pub use routes::Route;

use std::time::Duration;
use tokio::time::Instant;

use crate::auth::{AuthHandle, AuthState};
use crate::config::GuardConfig;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the loading indicator
    Loading,
    Redirect(String),
    Render,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    loading_timeout: Duration,
}

impl RouteGuard {
    pub fn new(loading_timeout: Duration) -> Self {
        Self { loading_timeout }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(config.loading_timeout())
    }

    pub fn loading_timeout(&self) -> Duration {
        self.loading_timeout
    }

    /// Decision for a signed-in-only page given the current state
    pub fn decide(state: &AuthState, timed_out: bool) -> GuardDecision {
        if state.loading && !timed_out {
            GuardDecision::Loading
        } else if state.user.is_none() {
            GuardDecision::Redirect(LOGIN_PATH.to_string())
        } else {
            GuardDecision::Render
        }
    }

    /// Route-aware decision: public pages always render and capability
    /// checks redirect to the dashboard
    pub fn decide_route(route: Route, state: &AuthState, timed_out: bool) -> GuardDecision {
        if route.is_public() {
            return GuardDecision::Render;
        }
        match Self::decide(state, timed_out) {
            GuardDecision::Render => match route.required_capability() {
                Some(cap) if !state.permissions().allows(cap) => {
                    tracing::debug!("{} requires {:?}, redirecting", route, cap);
                    GuardDecision::Redirect(DASHBOARD_PATH.to_string())
                }
                _ => GuardDecision::Render,
            },
            other => other,
        }
    }

    /// Wait until loading finishes or the cutoff passes, then decide. Never
    /// returns `Loading`.
    pub async fn resolve(&self, handle: &mut AuthHandle) -> GuardDecision {
        self.resolve_route(Route::Dashboard, handle).await
    }

    pub async fn resolve_route(&self, route: Route, handle: &mut AuthHandle) -> GuardDecision {
        if route.is_public() {
            return GuardDecision::Render;
        }
        match tokio::time::timeout(self.loading_timeout, handle.wait_for(|s| !s.loading)).await {
            Ok(Some(state)) => Self::decide_route(route, &state, false),
            Ok(None) => {
                tracing::warn!("Auth state closed while guarding {}", route);
                Self::decide_route(route, &handle.current(), true)
            }
            Err(_) => {
                tracing::warn!(
                    "Auth loading exceeded {}ms on {}, deciding with current state",
                    self.loading_timeout.as_millis(),
                    route
                );
                Self::decide_route(route, &handle.current(), true)
            }
        }
    }

    pub fn view(&self, route: Route) -> GuardedView {
        GuardedView::new(route, *self)
    }
}

/// Guard state for one navigation. Once it has rendered it stays rendered.
#[derive(Debug)]
pub struct GuardedView {
    route: Route,
    guard: RouteGuard,
    started: Instant,
    settled: Option<GuardDecision>,
}

impl GuardedView {
    pub fn new(route: Route, guard: RouteGuard) -> Self {
        Self {
            route,
            guard,
            started: Instant::now(),
            settled: None,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn timed_out(&self) -> bool {
        self.started.elapsed() >= self.guard.loading_timeout
    }

    /// Re-evaluate against a new state
    pub fn observe(&mut self, state: &AuthState) -> GuardDecision {
        if let Some(GuardDecision::Render) = &self.settled {
            return GuardDecision::Render;
        }
        let decision = RouteGuard::decide_route(self.route, state, self.timed_out());
        if decision == GuardDecision::Render {
            self.settled = Some(GuardDecision::Render);
        }
        decision
    }
}
