// services/mod.rs - CRUD service layer used by forms and list views
//
// Each resource is a `Repository<T>`. Whether it talks to the backend or is a
// stub is decided once, in `Services::compose`.

pub mod documents;
pub mod organizations;
pub mod registry;
pub mod remote;
pub mod stub;

pub use documents::DocumentUploader;
pub use organizations::create_for_owner;
pub use registry::Services;
pub use remote::RemoteRepository;
pub use stub::StubRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::backend::{BackendError, Query};
use crate::models::Record;

#[derive(Debug, thiserror::Error, Clone)]
pub enum ServiceError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Invalid {table} record: {message}")]
    InvalidRecord { table: &'static str, message: String },

    #[error("{0}")]
    Rejected(String),
}

impl ServiceError {
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Backend(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Async CRUD over one resource
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    fn resource(&self) -> &'static str {
        T::TABLE
    }

    async fn get_all(&self) -> Result<Vec<T>, ServiceError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, ServiceError>;

    /// Filtered listing
    async fn find(&self, query: &Query) -> Result<Vec<T>, ServiceError>;

    async fn create(&self, record: T) -> Result<T, ServiceError>;

    async fn update(&self, id: Uuid, record: T) -> Result<T, ServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
}
