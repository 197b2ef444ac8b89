// forms/case_intake.rs - Multi-step case intake
//
// The flat form mirrors the wizard's inputs. `to_case` regroups the client
// and background fields into the nested objects stored on the case row.

use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use super::rules;
use super::{FieldErrors, FormController, SubmitMessages, SubmitOutcome, Validate};
use crate::models::{Case, CaseDetails, CaseStatus, CaseType, ClientInfo, Priority};
use crate::notify::Notifier;
use crate::services::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    CaseDetails,
    ClientInformation,
    Background,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::CaseDetails,
        WizardStep::ClientInformation,
        WizardStep::Background,
        WizardStep::Review,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::CaseDetails => "Case details",
            WizardStep::ClientInformation => "Client information",
            WizardStep::Background => "Background",
            WizardStep::Review => "Review",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseIntakeForm {
    pub case_title: String,
    pub case_type: Option<CaseType>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,

    pub client_first_name: String,
    pub client_last_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub client_date_of_birth: Option<NaiveDate>,
    pub client_nationality: String,
    pub client_address: String,

    pub description: String,
    pub entry_date: Option<NaiveDate>,
    pub current_status: String,
    pub previous_applications: String,
    pub notes: String,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl CaseIntakeForm {
    /// Errors for the fields shown on one step
    pub fn validate_step(&self, step: WizardStep) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match step {
            WizardStep::CaseDetails => {
                rules::required_text(&mut errors, "case_title", "Case title", &self.case_title, 5);
                rules::required_choice(&mut errors, "case_type", "case type", &self.case_type);
            }
            WizardStep::ClientInformation => {
                rules::required_text(&mut errors, "client_first_name", "First name", &self.client_first_name, 2);
                rules::required_text(&mut errors, "client_last_name", "Last name", &self.client_last_name, 2);
                rules::required_email(&mut errors, "client_email", &self.client_email);
                rules::optional_phone(&mut errors, "client_phone", &self.client_phone);
                rules::past_date(&mut errors, "client_date_of_birth", "Date of birth", self.client_date_of_birth);
            }
            WizardStep::Background => {
                rules::required_text(&mut errors, "description", "Description", &self.description, 10);
                rules::past_date(&mut errors, "entry_date", "Entry date", self.entry_date);
            }
            WizardStep::Review => {}
        }
        errors
    }

    /// Regroup the flat fields into a case row
    pub fn to_case(&self, organization_id: Option<Uuid>, assigned_to: Option<Uuid>) -> Result<Case, ServiceError> {
        let case_type = self.case_type.ok_or_else(|| ServiceError::InvalidRecord {
            table: "cases",
            message: "case type is required".to_string(),
        })?;

        Ok(Case {
            id: None,
            title: self.case_title.trim().to_string(),
            case_type,
            status: CaseStatus::Open,
            priority: self.priority,
            client_info: ClientInfo {
                first_name: self.client_first_name.trim().to_string(),
                last_name: self.client_last_name.trim().to_string(),
                email: self.client_email.trim().to_string(),
                phone: optional(&self.client_phone),
                date_of_birth: self.client_date_of_birth.map(rules::format_date),
                nationality: optional(&self.client_nationality),
                address: optional(&self.client_address),
            },
            case_details: CaseDetails {
                description: self.description.trim().to_string(),
                entry_date: self.entry_date.map(rules::format_date),
                current_status: optional(&self.current_status),
                previous_applications: optional(&self.previous_applications),
                notes: optional(&self.notes),
            },
            due_date: self.due_date.map(rules::format_date),
            assigned_to,
            organization_id,
            created_at: None,
        })
    }
}

impl Validate for CaseIntakeForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for step in WizardStep::ALL {
            errors.merge(self.validate_step(step));
        }
        errors
    }
}

pub const CASE_CREATED: SubmitMessages = SubmitMessages {
    success_title: "Case created",
    success_description: "The case has been created successfully.",
    failure_title: "Failed to create case",
};

/// Step index over the intake form. Only the last step submits.
pub struct CaseIntakeWizard {
    form: FormController<CaseIntakeForm>,
    step: usize,
}

impl CaseIntakeWizard {
    pub const TOTAL_STEPS: usize = 4;

    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            form: FormController::new(CaseIntakeForm::default(), notifier),
            step: 0,
        }
    }

    pub fn form(&self) -> &FormController<CaseIntakeForm> {
        &self.form
    }

    pub fn values_mut(&mut self) -> &mut CaseIntakeForm {
        self.form.values_mut()
    }

    /// Zero-based index of the current step
    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::ALL[self.step]
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 == Self::TOTAL_STEPS
    }

    /// Move forward once the current step's fields are valid
    pub fn next(&mut self) -> Result<WizardStep, FieldErrors> {
        let errors = self.form.values().validate_step(self.current_step());
        if !errors.is_empty() {
            self.form.set_errors(errors.clone());
            return Err(errors);
        }
        self.form.set_errors(FieldErrors::new());
        if !self.is_last_step() {
            self.step += 1;
        }
        Ok(self.current_step())
    }

    pub fn previous(&mut self) -> WizardStep {
        self.step = self.step.saturating_sub(1);
        self.current_step()
    }

    /// Submit the full field set. Refused before the review step.
    pub async fn submit<T, Op, Fut>(&mut self, op: Op) -> SubmitOutcome<T>
    where
        Op: FnOnce(CaseIntakeForm) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        if !self.is_last_step() {
            return SubmitOutcome::Invalid(FieldErrors::single(
                "step",
                format!("Complete step {} of {} first", self.step + 1, Self::TOTAL_STEPS),
            ));
        }
        let outcome = self.form.submit(CASE_CREATED, op).await;
        if outcome.is_submitted() {
            self.step = 0;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FailPoint, MemoryBackend};
    use crate::notify::{ToastQueue, ToastVariant};
    use crate::services::{RemoteRepository, Repository};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts creates and otherwise behaves like an empty table
    #[derive(Default)]
    struct CountingCases {
        creates: AtomicUsize,
    }

    #[async_trait]
    impl Repository<Case> for CountingCases {
        async fn get_all(&self) -> Result<Vec<Case>, ServiceError> {
            Ok(Vec::new())
        }
        async fn get_by_id(&self, _id: Uuid) -> Result<Option<Case>, ServiceError> {
            Ok(None)
        }
        async fn find(&self, _query: &crate::backend::Query) -> Result<Vec<Case>, ServiceError> {
            Ok(Vec::new())
        }
        async fn create(&self, record: Case) -> Result<Case, ServiceError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Ok(record)
        }
        async fn update(&self, _id: Uuid, record: Case) -> Result<Case, ServiceError> {
            Ok(record)
        }
        async fn delete(&self, _id: Uuid) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    fn filled() -> CaseIntakeForm {
        CaseIntakeForm {
            case_title: "Asylum claim for A. Rahimi".to_string(),
            case_type: Some(CaseType::Asylum),
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2031, 1, 15),
            client_first_name: "Amir".to_string(),
            client_last_name: "Rahimi".to_string(),
            client_email: "amir@example.com".to_string(),
            client_phone: "+49 30 1234567".to_string(),
            client_date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 2),
            client_nationality: "Afghan".to_string(),
            description: "Arrived in 2023 and requested protection at the border.".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2023, 6, 1),
            ..Default::default()
        }
    }

    fn walk_to_review(wizard: &mut CaseIntakeWizard) {
        for _ in 1..CaseIntakeWizard::TOTAL_STEPS {
            wizard.next().unwrap();
        }
        assert!(wizard.is_last_step());
    }

    #[test]
    fn to_case_groups_and_formats() {
        let org = Uuid::new_v4();
        let case = filled().to_case(Some(org), None).unwrap();
        assert_eq!(case.client_info.first_name, "Amir");
        assert_eq!(case.client_info.date_of_birth.as_deref(), Some("1990-05-02"));
        assert_eq!(case.client_info.address, None);
        assert_eq!(case.case_details.entry_date.as_deref(), Some("2023-06-01"));
        assert_eq!(case.due_date.as_deref(), Some("2031-01-15"));
        assert_eq!(case.organization_id, Some(org));
        assert_eq!(case.status, CaseStatus::Open);
    }

    #[test]
    fn next_blocks_on_current_step() {
        let mut wizard = CaseIntakeWizard::new(Arc::new(ToastQueue::new()));
        let errors = wizard.next().unwrap_err();
        assert!(errors.contains("case_title"));
        assert!(errors.contains("case_type"));
        assert!(!errors.contains("client_email"));
        assert_eq!(wizard.current_step(), WizardStep::CaseDetails);

        wizard.values_mut().case_title = "Work permit renewal".to_string();
        wizard.values_mut().case_type = Some(CaseType::WorkPermit);
        assert_eq!(wizard.next().unwrap(), WizardStep::ClientInformation);
        assert_eq!(wizard.previous(), WizardStep::CaseDetails);
        assert_eq!(wizard.previous(), WizardStep::CaseDetails);
    }

    #[tokio::test]
    async fn missing_title_never_reaches_service() {
        let cases = CountingCases::default();
        let repo = &cases;
        let mut wizard = CaseIntakeWizard::new(Arc::new(ToastQueue::new()));
        *wizard.values_mut() = filled();
        walk_to_review(&mut wizard);
        wizard.values_mut().case_title.clear();

        let outcome = wizard
            .submit(|form| async move { repo.create(form.to_case(None, None)?).await })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.contains("case_title")));
        assert_eq!(cases.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_submission_calls_service_once() {
        let cases = CountingCases::default();
        let repo = &cases;
        let toasts = ToastQueue::new();
        let mut wizard = CaseIntakeWizard::new(Arc::new(toasts.clone()));
        *wizard.values_mut() = filled();

        let early = wizard
            .submit(|form| async move { repo.create(form.to_case(None, None)?).await })
            .await;
        assert!(matches!(early, SubmitOutcome::Invalid(ref e) if e.contains("step")));
        assert_eq!(cases.creates.load(Ordering::SeqCst), 0);

        walk_to_review(&mut wizard);
        let outcome = wizard
            .submit(|form| async move { repo.create(form.to_case(None, None)?).await })
            .await;

        assert!(outcome.is_submitted());
        assert_eq!(cases.creates.load(Ordering::SeqCst), 1);
        assert_eq!(wizard.step_index(), 0);
        assert_eq!(wizard.form().values(), &CaseIntakeForm::default());
        assert_eq!(toasts.drain()[0].title, "Case created");
    }

    #[tokio::test]
    async fn backend_failure_keeps_values() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail(FailPoint::Mutate);
        let remote = RemoteRepository::<Case>::new(backend.clone());
        let repo = &remote;
        let toasts = ToastQueue::new();
        let mut wizard = CaseIntakeWizard::new(Arc::new(toasts.clone()));
        *wizard.values_mut() = filled();
        walk_to_review(&mut wizard);

        let outcome = wizard
            .submit(|form| async move { repo.create(form.to_case(None, None)?).await })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert!(wizard.is_last_step());
        assert_eq!(wizard.form().values(), &filled());
        assert_eq!(toasts.drain()[0].variant, ToastVariant::Destructive);
    }
}
