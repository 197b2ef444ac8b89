use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use super::{Repository, ServiceError};
use crate::backend::{Query, TableClient};
use crate::models::Record;

/// Pass-through to a backend table
pub struct RemoteRepository<T> {
    tables: Arc<dyn TableClient>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RemoteRepository<T> {
    pub fn new(tables: Arc<dyn TableClient>) -> Self {
        Self {
            tables,
            _record: PhantomData,
        }
    }

    fn to_row(record: &T) -> Result<Value, ServiceError> {
        serde_json::to_value(record).map_err(|e| ServiceError::InvalidRecord {
            table: T::TABLE,
            message: e.to_string(),
        })
    }

    fn from_row(row: Value) -> Result<T, ServiceError> {
        serde_json::from_value(row).map_err(|e| ServiceError::InvalidRecord {
            table: T::TABLE,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl<T: Record> Repository<T> for RemoteRepository<T> {
    async fn get_all(&self) -> Result<Vec<T>, ServiceError> {
        self.find(&Query::new()).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, ServiceError> {
        let rows = self.tables.select(T::TABLE, &Query::new().eq("id", id).limit(1)).await?;
        rows.into_iter().next().map(Self::from_row).transpose()
    }

    async fn find(&self, query: &Query) -> Result<Vec<T>, ServiceError> {
        let rows = self.tables.select(T::TABLE, query).await?;
        rows.into_iter().map(Self::from_row).collect()
    }

    async fn create(&self, record: T) -> Result<T, ServiceError> {
        let row = self.tables.insert(T::TABLE, Self::to_row(&record)?).await?;
        Self::from_row(row)
    }

    async fn update(&self, id: Uuid, record: T) -> Result<T, ServiceError> {
        let row = self.tables.update(T::TABLE, id, Self::to_row(&record)?).await?;
        Self::from_row(row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.tables.delete(T::TABLE, id).await?;
        Ok(())
    }
}
