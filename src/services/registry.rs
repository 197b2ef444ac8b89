use std::sync::Arc;

use super::{DocumentUploader, RemoteRepository, Repository, StubRepository};
use crate::backend::{BackendHandles, TableClient};
use crate::config::AppConfig;
use crate::models::{CalendarEvent, Case, Document, DocumentType, FormTemplate, Organization, Record, UserProfile};
use crate::notify::Notifier;

/// Every resource's repository, chosen once at startup
#[derive(Clone)]
pub struct Services {
    pub profiles: Arc<dyn Repository<UserProfile>>,
    pub organizations: Arc<dyn Repository<Organization>>,
    pub document_types: Arc<dyn Repository<DocumentType>>,
    pub form_templates: Arc<dyn Repository<FormTemplate>>,
    pub cases: Arc<dyn Repository<Case>>,
    pub documents: Arc<dyn Repository<Document>>,
    pub calendar: Arc<dyn Repository<CalendarEvent>>,
    pub uploads: DocumentUploader,
}

impl Services {
    pub fn compose(config: &AppConfig, backend: &BackendHandles, notifier: Arc<dyn Notifier>) -> Self {
        let documents = select::<Document>(config, &backend.tables, &notifier);

        Self {
            profiles: select(config, &backend.tables, &notifier),
            organizations: select(config, &backend.tables, &notifier),
            document_types: select(config, &backend.tables, &notifier),
            form_templates: select(config, &backend.tables, &notifier),
            cases: select(config, &backend.tables, &notifier),
            calendar: select(config, &backend.tables, &notifier),
            uploads: DocumentUploader::new(
                backend.storage.clone(),
                documents.clone(),
                config.backend.storage_bucket.clone(),
            ),
            documents,
        }
    }
}

fn select<T: Record>(
    config: &AppConfig,
    tables: &Arc<dyn TableClient>,
    notifier: &Arc<dyn Notifier>,
) -> Arc<dyn Repository<T>> {
    if config.services.is_disabled(T::TABLE) {
        tracing::debug!("Service for {} is stubbed", T::TABLE);
        Arc::new(StubRepository::<T>::new(notifier.clone()))
    } else {
        Arc::new(RemoteRepository::<T>::new(tables.clone()))
    }
}
