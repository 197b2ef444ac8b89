// forms/mod.rs - Client-side validated forms
//
// Every form follows the same contract: validate synchronously, call exactly
// one service function, then reset on success or keep the values on failure.
// `FormController` implements that contract once for all of them.

pub mod admin;
pub mod case_intake;
pub mod document_upload;
pub mod organization;
pub mod profile;
pub mod rules;

pub use admin::{DocumentTypeForm, FormTemplateForm, RoleAssignmentForm};
pub use case_intake::{CaseIntakeForm, CaseIntakeWizard, WizardStep};
pub use document_upload::{DocumentUploadForm, FileAttachment};
pub use organization::OrganizationForm;
pub use profile::ProfileForm;

use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use crate::notify::{Notifier, Toast};
use crate::services::ServiceError;

/// Per-field error text, first error per field wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.0.entry(field).or_insert(message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

pub trait Validate {
    /// Empty when the form may be submitted
    fn validate(&self) -> FieldErrors;
}

/// Notification text for one form
#[derive(Debug, Clone, Copy)]
pub struct SubmitMessages {
    pub success_title: &'static str,
    pub success_description: &'static str,
    pub failure_title: &'static str,
}

#[derive(Debug)]
pub enum SubmitOutcome<T> {
    /// Blocked before any service call
    Invalid(FieldErrors),
    Submitted(T),
    Failed(ServiceError),
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// Holds a form's values and runs the shared submit contract
pub struct FormController<F> {
    values: F,
    defaults: F,
    errors: FieldErrors,
    notifier: Arc<dyn Notifier>,
}

impl<F: Validate + Clone> FormController<F> {
    pub fn new(defaults: F, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            values: defaults.clone(),
            defaults,
            errors: FieldErrors::new(),
            notifier,
        }
    }

    pub fn values(&self) -> &F {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut F {
        &mut self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Replace the inline errors, e.g. after a wizard step check
    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.errors = FieldErrors::new();
    }

    /// Validate, then hand a copy of the values to `op` exactly once.
    ///
    /// `op` does any payload reshaping and calls one service function.
    pub async fn submit<T, Op, Fut>(&mut self, messages: SubmitMessages, op: Op) -> SubmitOutcome<T>
    where
        Op: FnOnce(F) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let errors = self.values.validate();
        if !errors.is_empty() {
            tracing::debug!("Form submission blocked: {}", errors);
            self.errors = errors.clone();
            return SubmitOutcome::Invalid(errors);
        }
        self.errors = FieldErrors::new();

        match op(self.values.clone()).await {
            Ok(result) => {
                self.reset();
                self.notifier
                    .notify(Toast::success(messages.success_title, messages.success_description));
                SubmitOutcome::Submitted(result)
            }
            Err(e) => {
                tracing::error!("{}: {}", messages.failure_title, e);
                self.notifier.notify(Toast::error(messages.failure_title, e.user_message()));
                SubmitOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::notify::{ToastQueue, ToastVariant};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct NameForm {
        name: String,
    }

    impl Validate for NameForm {
        fn validate(&self) -> FieldErrors {
            let mut errors = FieldErrors::new();
            rules::required_text(&mut errors, "name", "Name", &self.name, 2);
            errors
        }
    }

    const MESSAGES: SubmitMessages = SubmitMessages {
        success_title: "Saved",
        success_description: "Record saved",
        failure_title: "Save failed",
    };

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.get("name"), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn invalid_form_never_calls_service() {
        let toasts = ToastQueue::new();
        let mut form = FormController::new(NameForm::default(), Arc::new(toasts.clone()));
        let mut calls = 0;

        let outcome = form
            .submit(MESSAGES, |_| {
                calls += 1;
                async { Ok::<_, ServiceError>(()) }
            })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.contains("name")));
        assert_eq!(calls, 0);
        assert!(toasts.drain().is_empty());
        assert!(form.errors().contains("name"));
    }

    #[tokio::test]
    async fn success_resets_and_notifies() {
        let toasts = ToastQueue::new();
        let mut form = FormController::new(NameForm::default(), Arc::new(toasts.clone()));
        form.values_mut().name = "Ana".to_string();

        let outcome = form
            .submit(MESSAGES, |values| async move { Ok::<_, ServiceError>(values.name) })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Submitted(ref n) if n == "Ana"));
        assert_eq!(form.values(), &NameForm::default());
        assert_eq!(toasts.drain()[0].variant, ToastVariant::Success);
    }

    #[tokio::test]
    async fn failure_keeps_values_and_shows_error() {
        let toasts = ToastQueue::new();
        let mut form = FormController::new(NameForm::default(), Arc::new(toasts.clone()));
        form.values_mut().name = "Ana".to_string();

        let outcome = form
            .submit(MESSAGES, |_| async {
                Err::<(), _>(ServiceError::Backend(BackendError::Http {
                    status: 409,
                    message: "duplicate key".to_string(),
                }))
            })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(form.values().name, "Ana");
        let toast = &toasts.drain()[0];
        assert_eq!(toast.variant, ToastVariant::Destructive);
        assert_eq!(toast.description.as_deref(), Some("duplicate key"));
    }
}
