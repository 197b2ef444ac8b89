// forms/admin.rs - Admin record editors

use serde_json::Value;
use uuid::Uuid;

use super::rules;
use super::{FieldErrors, SubmitMessages, Validate};
use crate::models::{CaseType, DocumentType, FormTemplate, Role, UserProfile};

pub const ROLE_ASSIGNED: SubmitMessages = SubmitMessages {
    success_title: "Role updated",
    success_description: "The user's role has been updated.",
    failure_title: "Failed to update role",
};

pub const DOCUMENT_TYPE_SAVED: SubmitMessages = SubmitMessages {
    success_title: "Document type saved",
    success_description: "The document type has been saved.",
    failure_title: "Failed to save document type",
};

pub const FORM_TEMPLATE_SAVED: SubmitMessages = SubmitMessages {
    success_title: "Form template saved",
    success_description: "The form template has been saved.",
    failure_title: "Failed to save form template",
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignmentForm {
    pub user_id: Option<Uuid>,
    pub role: Option<Role>,
    pub organization_id: Option<Uuid>,
    pub is_organization_admin: bool,
}

impl RoleAssignmentForm {
    pub fn apply(&self, mut profile: UserProfile) -> UserProfile {
        if let Some(role) = self.role {
            profile.role = role;
        }
        profile.organization_id = self.organization_id;
        profile.is_organization_admin = self.is_organization_admin && self.organization_id.is_some();
        profile
    }
}

impl Validate for RoleAssignmentForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        rules::required_choice(&mut errors, "user_id", "user", &self.user_id);
        rules::required_choice(&mut errors, "role", "role", &self.role);
        if self.is_organization_admin && self.organization_id.is_none() {
            errors.add("organization_id", "Organization admins must belong to an organization");
        }
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypeForm {
    pub name: String,
    pub category: String,
    pub description: String,
    /// Comma-separated, e.g. `pdf, jpg`
    pub allowed_extensions: String,
    pub required: bool,
}

impl DocumentTypeForm {
    pub fn extensions(&self) -> Vec<String> {
        self.allowed_extensions
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn to_document_type(&self) -> DocumentType {
        let description = self.description.trim();
        DocumentType {
            id: None,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            allowed_extensions: self.extensions(),
            required: self.required,
        }
    }
}

impl Validate for DocumentTypeForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        rules::required_text(&mut errors, "name", "Name", &self.name, 2);
        rules::required_text(&mut errors, "category", "Category", &self.category, 2);

        let extensions = self.extensions();
        if extensions.is_empty() {
            errors.add("allowed_extensions", "At least one file extension is required");
        } else if let Some(bad) = extensions
            .iter()
            .find(|e| !e.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            errors.add("allowed_extensions", format!("Invalid extension '{}'", bad));
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTemplateForm {
    pub name: String,
    pub description: String,
    pub case_type: Option<CaseType>,
    /// JSON array of field definitions
    pub fields: String,
}

impl Default for FormTemplateForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            case_type: None,
            fields: "[]".to_string(),
        }
    }
}

impl FormTemplateForm {
    fn parsed_fields(&self) -> Option<Value> {
        serde_json::from_str::<Value>(&self.fields)
            .ok()
            .filter(Value::is_array)
    }

    pub fn to_template(&self) -> FormTemplate {
        let description = self.description.trim();
        FormTemplate {
            id: None,
            name: self.name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            case_type: self.case_type.map(|t| t.as_str().to_string()),
            fields: self.parsed_fields().unwrap_or_else(|| Value::Array(Vec::new())),
        }
    }
}

impl Validate for FormTemplateForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        rules::required_text(&mut errors, "name", "Template name", &self.name, 3);
        if self.parsed_fields().is_none() {
            errors.add("fields", "Fields must be a JSON array");
        }
        errors
    }
}
