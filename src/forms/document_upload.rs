// forms/document_upload.rs - File upload with type and size checks

use std::path::Path;
use uuid::Uuid;

use super::{FieldErrors, SubmitMessages, Validate};
use crate::models::DocumentType;

pub const DOCUMENT_UPLOADED: SubmitMessages = SubmitMessages {
    success_title: "Document uploaded",
    success_description: "Your document has been uploaded successfully.",
    failure_title: "Upload failed",
};

/// A file picked for upload, held fully in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = content_type_for(&name);
        Ok(Self::new(name, content_type, bytes))
    }

    /// Lowercase extension without the dot
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUploadForm {
    pub document_type: Option<DocumentType>,
    pub case_id: Option<Uuid>,
    pub file: Option<FileAttachment>,
    pub notes: String,
    max_file_bytes: u64,
}

impl DocumentUploadForm {
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            document_type: None,
            case_id: None,
            file: None,
            notes: String::new(),
            max_file_bytes,
        }
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }
}

impl Validate for DocumentUploadForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.document_type.is_none() {
            errors.add("document_type", "Please select a document type");
        }

        let file = match &self.file {
            Some(file) => file,
            None => {
                errors.add("file", "Please select a file");
                return errors;
            }
        };

        if file.size() > self.max_file_bytes {
            errors.add(
                "file",
                format!("File size must be less than {}MB", self.max_file_bytes / (1024 * 1024)),
            );
        }

        if let Some(doc_type) = &self.document_type {
            let allowed = file
                .extension()
                .map(|ext| doc_type.allows_extension(&ext))
                .unwrap_or(false);
            if !allowed {
                errors.add(
                    "file",
                    format!("Invalid file type. Allowed formats: {}", doc_type.allowed_formats()),
                );
            }
        }
        errors
    }
}
