// backend/mod.rs - Boundary to the hosted backend (auth, tables, storage)
//
// Every remote capability sits behind its own trait so callers can be handed
// the hosted client or the in-memory fixture without knowing which one.

pub mod error;
pub mod memory;
pub mod remote;
pub mod session;

pub use error::{BackendError, OFFLINE_MESSAGE};
pub use memory::{FailPoint, MemoryBackend};
pub use remote::RemoteBackend;
pub use session::{
    AuthChangeEvent, AuthenticatedUser, FileSessionStore, MemorySessionStore, Session, SessionStore,
};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::{AppConfig, BackendMode};
use crate::models::AdminUser;

/// Authentication endpoints
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Existing session, refreshed if it has expired. `None` when signed out.
    async fn get_session(&self) -> Result<Option<Session>, BackendError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Resolve the user an access token belongs to
    async fn get_user(&self, access_token: &str) -> Result<AuthenticatedUser, BackendError>;

    /// Subscribe to auth-change events. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthChangeEvent>;
}

/// Row CRUD against backend tables
#[async_trait]
pub trait TableClient: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;
    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError>;
    async fn update(&self, table: &str, id: Uuid, patch: Value) -> Result<Value, BackendError>;
    async fn delete(&self, table: &str, id: Uuid) -> Result<(), BackendError>;
}

/// Blob storage
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Upload bytes and return the stored object path
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, BackendError>;
}

/// Privileged user administration
#[async_trait]
pub trait AdminClient: Send + Sync {
    async fn list_users(&self) -> Result<Vec<AdminUser>, BackendError>;

    /// Cheap reachability probe
    async fn health(&self) -> Result<(), BackendError>;
}

/// Column filter / order / limit for a table select
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Shared handles to one backend, split by capability
#[derive(Clone)]
pub struct BackendHandles {
    pub auth: Arc<dyn AuthClient>,
    pub tables: Arc<dyn TableClient>,
    pub storage: Arc<dyn StorageClient>,
    pub admin: Arc<dyn AdminClient>,
}

impl BackendHandles {
    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: AuthClient + TableClient + StorageClient + AdminClient + 'static,
    {
        Self {
            auth: backend.clone(),
            tables: backend.clone(),
            storage: backend.clone(),
            admin: backend,
        }
    }

    /// Build the backend selected by configuration
    pub fn from_config(config: &AppConfig, store: Arc<dyn SessionStore>) -> Result<Self, BackendError> {
        match config.backend.mode {
            BackendMode::Remote => {
                let backend = RemoteBackend::new(&config.backend, store)?;
                tracing::info!("Using hosted backend at {}", config.backend.url);
                Ok(Self::from_shared(Arc::new(backend)))
            }
            BackendMode::Memory => {
                tracing::info!("Using in-memory backend");
                Ok(Self::from_shared(Arc::new(MemoryBackend::seeded())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder_accumulates() {
        let id = Uuid::nil();
        let q = Query::new().eq("id", id).order("created_at", false).limit(5);
        assert_eq!(q.filters, vec![("id".to_string(), id.to_string())]);
        assert_eq!(q.order, Some(("created_at".to_string(), false)));
        assert_eq!(q.limit, Some(5));
    }
}
