use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use super::{Repository, ServiceError};
use crate::backend::Query;
use crate::models::Record;
use crate::notify::{Notifier, Toast};

/// Stand-in for a resource whose table is gone.
///
/// Reads return nothing, mutations echo their input and raise a
/// "temporarily disabled" notice. Never fails.
pub struct StubRepository<T> {
    notifier: Arc<dyn Notifier>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> StubRepository<T> {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            _record: PhantomData,
        }
    }

    fn disabled(&self, operation: &str) {
        tracing::info!("{} on {} skipped: resource is stubbed", operation, T::TABLE);
        self.notifier.notify(Toast::feature_disabled(T::TABLE));
    }
}

#[async_trait]
impl<T: Record> Repository<T> for StubRepository<T> {
    async fn get_all(&self) -> Result<Vec<T>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get_by_id(&self, _id: Uuid) -> Result<Option<T>, ServiceError> {
        Ok(None)
    }

    async fn find(&self, _query: &Query) -> Result<Vec<T>, ServiceError> {
        Ok(Vec::new())
    }

    async fn create(&self, record: T) -> Result<T, ServiceError> {
        self.disabled("create");
        Ok(record)
    }

    async fn update(&self, _id: Uuid, record: T) -> Result<T, ServiceError> {
        self.disabled("update");
        Ok(record)
    }

    async fn delete(&self, _id: Uuid) -> Result<(), ServiceError> {
        self.disabled("delete");
        Ok(())
    }
}
