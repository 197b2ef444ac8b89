use clap::Subcommand;
use uuid::Uuid;

use crate::auth::{AuthState, Capability};
use crate::cli::{config, utils, Shell};
use crate::forms::admin::{DOCUMENT_TYPE_SAVED, FORM_TEMPLATE_SAVED, ROLE_ASSIGNED};
use crate::forms::{DocumentTypeForm, FormController, FormTemplateForm, RoleAssignmentForm, SubmitOutcome};
use crate::guard::Route;
use crate::models::{AdminUser, CaseType, Role};

fn parse_case_type(value: &str) -> Result<CaseType, String> {
    CaseType::parse(value).ok_or_else(|| format!("unknown case type '{}'", value))
}

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "List every user through the server's admin endpoint")]
    Users {
        #[arg(long, help = "casedesk-server URL (defaults to CASEDESK_SERVER_URL)")]
        server: Option<String>,
    },

    #[command(about = "Assign a role and organization to a user")]
    Role {
        #[arg(help = "User id")]
        user_id: Uuid,
        #[arg(help = "applicant, representative or admin")]
        role: Role,
        #[arg(long, help = "Organization id")]
        org: Option<Uuid>,
        #[arg(long, help = "Make the user an organization admin")]
        org_admin: bool,
    },

    #[command(about = "Create a document type")]
    DocType {
        name: String,
        category: String,
        #[arg(long, help = "Comma-separated extensions, e.g. pdf,jpg,png")]
        extensions: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        required: bool,
    },

    #[command(about = "Create an intake form template")]
    Template {
        name: String,
        #[arg(long = "case-type", value_parser = parse_case_type)]
        case_type: Option<CaseType>,
        #[arg(long, default_value = "[]", help = "JSON array of field definitions")]
        fields: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

fn require(state: &AuthState, capability: Capability) -> anyhow::Result<()> {
    if state.permissions().allows(capability) {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Admin access required"))
    }
}

fn finish<T: serde::Serialize>(shell: &Shell, outcome: SubmitOutcome<T>, message: &str, key: &str) -> anyhow::Result<()> {
    match outcome {
        SubmitOutcome::Submitted(record) => utils::output_success(
            &shell.format,
            message,
            Some(serde_json::json!({ key: record })),
        ),
        SubmitOutcome::Invalid(errors) => {
            utils::output_field_errors(&shell.format, &errors)?;
            Err(anyhow::anyhow!("Invalid fields"))
        }
        SubmitOutcome::Failed(e) => Err(anyhow::anyhow!(e.user_message())),
    }
}

pub async fn handle(cmd: AdminCommands, shell: &Shell) -> anyhow::Result<()> {
    let state = shell.enter(Route::Admin).await?;

    match cmd {
        AdminCommands::Users { server } => {
            let token = state
                .session
                .as_ref()
                .map(|s| s.access_token.clone())
                .ok_or_else(|| anyhow::anyhow!("No session token"))?;
            let url = format!("{}/api/admin/users", config::server_url(server));

            let response = reqwest::Client::new().get(&url).bearer_auth(token).send().await?;
            let status = response.status();
            let body: serde_json::Value = response.json().await?;
            if !status.is_success() {
                let message = body["message"].as_str().unwrap_or("request failed");
                return Err(anyhow::anyhow!("{} ({})", message, status));
            }

            let users: Vec<AdminUser> = serde_json::from_value(body["users"].clone())?;
            utils::output_list(&shell.format, "users", &users, "No users", |u| {
                format!(
                    "{}  {:<32}{}",
                    u.id,
                    u.email.as_deref().unwrap_or("-"),
                    u.last_sign_in_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "never".to_string())
                )
            })
        }
        AdminCommands::Role {
            user_id,
            role,
            org,
            org_admin,
        } => {
            require(&state, Capability::ManageUsers)?;
            let existing = shell
                .services
                .profiles
                .get_by_id(user_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No profile for user {}", user_id))?;

            let mut form = FormController::new(RoleAssignmentForm::default(), shell.notifier());
            *form.values_mut() = RoleAssignmentForm {
                user_id: Some(user_id),
                role: Some(role),
                organization_id: org,
                is_organization_admin: org_admin,
            };

            let profiles = shell.services.profiles.clone();
            let outcome = form
                .submit(ROLE_ASSIGNED, |values| async move {
                    profiles.update(user_id, values.apply(existing)).await
                })
                .await;
            finish(shell, outcome, "Role updated", "profile")
        }
        AdminCommands::DocType {
            name,
            category,
            extensions,
            description,
            required,
        } => {
            require(&state, Capability::ManageDocumentTypes)?;
            let mut form = FormController::new(DocumentTypeForm::default(), shell.notifier());
            *form.values_mut() = DocumentTypeForm {
                name,
                category,
                description,
                allowed_extensions: extensions,
                required,
            };

            let types = shell.services.document_types.clone();
            let outcome = form
                .submit(DOCUMENT_TYPE_SAVED, |values| async move {
                    types.create(values.to_document_type()).await
                })
                .await;
            finish(shell, outcome, "Document type saved", "document_type")
        }
        AdminCommands::Template {
            name,
            case_type,
            fields,
            description,
        } => {
            require(&state, Capability::ManageFormTemplates)?;
            let mut form = FormController::new(FormTemplateForm::default(), shell.notifier());
            *form.values_mut() = FormTemplateForm {
                name,
                description,
                case_type,
                fields,
            };

            let templates = shell.services.form_templates.clone();
            let outcome = form
                .submit(FORM_TEMPLATE_SAVED, |values| async move {
                    templates.create(values.to_template()).await
                })
                .await;
            finish(shell, outcome, "Form template saved", "form_template")
        }
    }
}
