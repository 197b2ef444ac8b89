use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Record;

/// Uploaded file attached to a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub case_id: Option<Uuid>,
    pub document_type_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub content_type: String,
    #[serde(default)]
    pub uploaded_by: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Document {
    const TABLE: &'static str = "documents";

    fn id(&self) -> Option<Uuid> {
        self.id
    }
}

/// Catalog entry describing which files a category of document accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Lowercase extensions without the leading dot
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl DocumentType {
    pub fn allows_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }

    /// Human-readable list, e.g. `PDF, JPG, PNG`
    pub fn allowed_formats(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Record for DocumentType {
    const TABLE: &'static str = "document_types";

    fn id(&self) -> Option<Uuid> {
        self.id
    }
}

/// Admin-defined intake form layout for a case type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub fields: serde_json::Value,
}

impl Record for FormTemplate {
    const TABLE: &'static str = "form_templates";

    fn id(&self) -> Option<Uuid> {
        self.id
    }
}
