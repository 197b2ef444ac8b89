#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use casedesk::backend::{BackendHandles, MemoryBackend};
use casedesk::config::AppConfig;
use casedesk::handlers::AppState;
use casedesk::models::{Role, UserProfile};
use casedesk::notify::ToastQueue;
use casedesk::services::Services;

pub struct TestApp {
    pub backend: Arc<MemoryBackend>,
    pub router: Router,
}

/// Development config with every service wired to the backend
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.services.disabled.clear();
    config
}

pub fn spawn_app() -> TestApp {
    let config = test_config();
    let backend = Arc::new(MemoryBackend::seeded());
    let handles = BackendHandles::from_shared(backend.clone());
    let services = Services::compose(&config, &handles, Arc::new(ToastQueue::new()));
    let router = casedesk::server::app(AppState::new(&handles, &services), &config.server);
    TestApp { backend, router }
}

impl TestApp {
    /// Create an account with a profile of `role` and return its access token
    pub fn token_for(&self, email: &str, role: Option<Role>) -> String {
        let user = self.backend.add_account(email, "password");
        if let Some(role) = role {
            self.backend.insert_record(&UserProfile::new(user.id, role));
        }
        self.backend.issue_session(&user).access_token
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty())?)
            .await?;

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token).await
    }
}
