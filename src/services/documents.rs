use std::sync::Arc;
use uuid::Uuid;

use super::{Repository, ServiceError};
use crate::backend::StorageClient;
use crate::forms::DocumentUploadForm;
use crate::models::Document;

/// Stores an uploaded file, then records it in the documents table
#[derive(Clone)]
pub struct DocumentUploader {
    storage: Arc<dyn StorageClient>,
    documents: Arc<dyn Repository<Document>>,
    bucket: String,
}

impl DocumentUploader {
    pub fn new(storage: Arc<dyn StorageClient>, documents: Arc<dyn Repository<Document>>, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            documents,
            bucket: bucket.into(),
        }
    }

    /// Upload a form that has already passed validation
    pub async fn upload(&self, uploaded_by: Uuid, form: DocumentUploadForm) -> Result<Document, ServiceError> {
        let document_type_id = form
            .document_type
            .as_ref()
            .and_then(|t| t.id)
            .ok_or_else(|| ServiceError::Rejected("Please select a document type".to_string()))?;
        let file = form
            .file
            .ok_or_else(|| ServiceError::Rejected("Please select a file".to_string()))?;

        let extension = file.extension().unwrap_or_else(|| "bin".to_string());
        let path = format!("{}/{}.{}", uploaded_by, Uuid::new_v4(), extension);
        let file_size = file.size();

        tracing::info!("Uploading {} ({} bytes) to {}/{}", file.name, file_size, self.bucket, path);
        let stored_path = self
            .storage
            .upload(&self.bucket, &path, file.bytes, &file.content_type, false)
            .await?;

        let notes = form.notes.trim();
        self.documents
            .create(Document {
                id: None,
                case_id: form.case_id,
                document_type_id,
                file_name: file.name,
                file_path: stored_path,
                file_size,
                content_type: file.content_type,
                uploaded_by: Some(uploaded_by),
                notes: (!notes.is_empty()).then(|| notes.to_string()),
                created_at: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FailPoint, MemoryBackend};
    use crate::forms::FileAttachment;
    use crate::models::DocumentType;
    use crate::notify::ToastQueue;
    use crate::services::{RemoteRepository, StubRepository};

    fn form() -> DocumentUploadForm {
        let mut form = DocumentUploadForm::new(20 * 1024 * 1024);
        form.document_type = Some(DocumentType {
            id: Some(Uuid::new_v4()),
            name: "Passport".to_string(),
            category: "identity".to_string(),
            description: None,
            allowed_extensions: vec!["pdf".to_string()],
            required: true,
        });
        form.file = Some(FileAttachment::new("passport.PDF", "application/pdf", vec![1, 2, 3]));
        form.notes = "  front page ".to_string();
        form
    }

    #[tokio::test]
    async fn stores_blob_and_records_document() {
        let backend = Arc::new(MemoryBackend::new());
        let uploader = DocumentUploader::new(
            backend.clone(),
            Arc::new(RemoteRepository::<Document>::new(backend.clone())),
            "documents",
        );
        let user = Uuid::new_v4();

        let doc = uploader.upload(user, form()).await.unwrap();
        assert!(doc.file_path.starts_with(&user.to_string()));
        assert!(doc.file_path.ends_with(".pdf"));
        assert_eq!(doc.file_size, 3);
        assert_eq!(doc.notes.as_deref(), Some("front page"));

        let (bytes, content_type) = backend.object(&format!("documents/{}", doc.file_path)).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(content_type, "application/pdf");
        assert_eq!(backend.rows("documents").len(), 1);
    }

    #[tokio::test]
    async fn stubbed_documents_table_echoes_record() {
        let backend = Arc::new(MemoryBackend::new());
        let uploader = DocumentUploader::new(
            backend.clone(),
            Arc::new(StubRepository::<Document>::new(Arc::new(ToastQueue::new()))),
            "documents",
        );
        let doc = uploader.upload(Uuid::new_v4(), form()).await.unwrap();
        assert!(doc.id.is_none());
        assert!(backend.rows("documents").is_empty());
    }

    #[tokio::test]
    async fn storage_failure_skips_record() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail(FailPoint::Upload);
        let uploader = DocumentUploader::new(
            backend.clone(),
            Arc::new(RemoteRepository::<Document>::new(backend.clone())),
            "documents",
        );
        assert!(uploader.upload(Uuid::new_v4(), form()).await.is_err());
        assert!(backend.rows("documents").is_empty());
    }
}
