// forms/organization.rs - Create an organization

use uuid::Uuid;

use super::rules;
use super::{FieldErrors, SubmitMessages, Validate};
use crate::models::Organization;

pub const ORGANIZATION_CREATED: SubmitMessages = SubmitMessages {
    success_title: "Organization created",
    success_description: "Your organization has been created and you are its administrator.",
    failure_title: "Failed to create organization",
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationForm {
    pub name: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl OrganizationForm {
    pub fn to_organization(&self, created_by: Uuid) -> Organization {
        Organization {
            id: None,
            name: self.name.trim().to_string(),
            description: optional(&self.description),
            email: optional(&self.email),
            phone: optional(&self.phone),
            address: optional(&self.address),
            created_by: Some(created_by),
            created_at: None,
        }
    }
}

impl Validate for OrganizationForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        rules::required_text(&mut errors, "name", "Organization name", &self.name, 2);
        rules::optional_text(&mut errors, "description", "Description", &self.description, 10);
        rules::optional_email(&mut errors, "email", &self.email);
        rules::optional_phone(&mut errors, "phone", &self.phone);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_name_is_required() {
        let form = OrganizationForm {
            name: "Refugee Law Clinic".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_empty());

        let org = form.to_organization(Uuid::nil());
        assert_eq!(org.description, None);
        assert_eq!(org.created_by, Some(Uuid::nil()));
    }

    #[test]
    fn optional_fields_still_checked() {
        let form = OrganizationForm {
            name: "X".to_string(),
            email: "clinic".to_string(),
            description: "short".to_string(),
            ..Default::default()
        };
        let errors = form.validate();
        assert!(errors.contains("name"));
        assert!(errors.contains("email"));
        assert!(errors.contains("description"));
    }
}
