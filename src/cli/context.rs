// cli/context.rs - Wiring shared by every CLI command
//
// One `Shell` per process: backend handles, composed services, the auth
// bootstrap and the route guard. Commands reach protected data only through
// `enter`, which applies the guard exactly as a page navigation would.

use std::sync::Arc;

use crate::auth::{AuthBootstrap, AuthState};
use crate::backend::{BackendHandles, FileSessionStore};
use crate::cli::{config, utils, OutputFormat};
use crate::config::AppConfig;
use crate::guard::{GuardDecision, Route, RouteGuard};
use crate::notify::{Notifier, ToastQueue};
use crate::services::Services;

pub struct Shell {
    pub config: AppConfig,
    pub backend: BackendHandles,
    pub services: Services,
    pub guard: RouteGuard,
    pub format: OutputFormat,
    bootstrap: AuthBootstrap,
    toasts: ToastQueue,
}

impl Shell {
    /// Build from the process configuration with a file-backed session
    pub async fn open(format: OutputFormat) -> anyhow::Result<Self> {
        let config = crate::config::config().clone();
        let store = Arc::new(FileSessionStore::new(config::session_path()?));
        let backend = BackendHandles::from_config(&config, store)?;
        Ok(Self::with_backend(config, backend, format))
    }

    /// Must be called inside a tokio runtime
    pub fn with_backend(config: AppConfig, backend: BackendHandles, format: OutputFormat) -> Self {
        let toasts = ToastQueue::new();
        let notifier: Arc<dyn Notifier> = Arc::new(toasts.clone());
        let services = Services::compose(&config, &backend, notifier.clone());
        let bootstrap = AuthBootstrap::mount(backend.auth.clone(), services.profiles.clone(), notifier);
        let guard = RouteGuard::from_config(&config.guard);

        Self {
            config,
            backend,
            services,
            guard,
            format,
            bootstrap,
            toasts,
        }
    }

    pub fn bootstrap(&self) -> &AuthBootstrap {
        &self.bootstrap
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::new(self.toasts.clone())
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// State once loading finishes, or whatever is there at the cutoff
    pub async fn settle(&self) -> AuthState {
        self.wait_until(|s| !s.loading).await
    }

    /// Wait for a sign-in or sign-out to land, bounded by the guard cutoff
    pub async fn wait_until(&self, predicate: impl FnMut(&AuthState) -> bool) -> AuthState {
        let mut handle = self.bootstrap.handle();
        match tokio::time::timeout(self.guard.loading_timeout(), handle.wait_for(predicate)).await {
            Ok(Some(state)) => state,
            _ => handle.current(),
        }
    }

    /// Navigate to `route`; errors with the redirect target when refused
    pub async fn enter(&self, route: Route) -> anyhow::Result<AuthState> {
        let mut handle = self.bootstrap.handle();
        match self.guard.resolve_route(route, &mut handle).await {
            GuardDecision::Render => Ok(handle.current()),
            GuardDecision::Redirect(target) if target == crate::guard::LOGIN_PATH => Err(anyhow::anyhow!(
                "{} requires sign-in (redirected to {}). Run `casedesk auth login <email>` first.",
                route,
                target
            )),
            GuardDecision::Redirect(target) => Err(anyhow::anyhow!(
                "Your account cannot open {} (redirected to {})",
                route,
                target
            )),
            GuardDecision::Loading => Err(anyhow::anyhow!("Still loading {}", route)),
        }
    }

    pub fn flush_toasts(&self) -> anyhow::Result<()> {
        utils::output_toasts(&self.format, &self.toasts.drain())
    }
}
