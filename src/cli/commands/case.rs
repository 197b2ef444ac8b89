use chrono::NaiveDate;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::auth::Capability;
use crate::backend::Query;
use crate::cli::{utils, Shell};
use crate::forms::{CaseIntakeWizard, SubmitOutcome};
use crate::guard::Route;
use crate::models::{CaseType, Priority};

fn parse_case_type(value: &str) -> Result<CaseType, String> {
    CaseType::parse(value).ok_or_else(|| {
        let known: Vec<_> = CaseType::ALL.iter().map(|t| t.as_str()).collect();
        format!("expected one of {}", known.join(", "))
    })
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| "expected low, medium, high or urgent".to_string())
}

#[derive(Args)]
pub struct NewCaseArgs {
    #[arg(long, help = "Case title")]
    pub title: String,
    #[arg(long = "type", value_parser = parse_case_type, help = "Case type, e.g. asylum")]
    pub case_type: Option<CaseType>,
    #[arg(long, value_parser = parse_priority, default_value = "medium")]
    pub priority: Priority,
    #[arg(long, help = "Due date (YYYY-MM-DD)")]
    pub due: Option<NaiveDate>,

    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, help = "Client date of birth (YYYY-MM-DD)")]
    pub date_of_birth: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    pub nationality: String,
    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long, help = "Background of the case")]
    pub description: String,
    #[arg(long, help = "Entry date into the country (YYYY-MM-DD)")]
    pub entry_date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    pub current_status: String,
    #[arg(long, default_value = "")]
    pub previous_applications: String,
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Subcommand)]
pub enum CaseCommands {
    #[command(about = "List cases visible to you")]
    List,

    #[command(about = "Open a new case through the intake wizard")]
    New(NewCaseArgs),
}

pub async fn handle(cmd: CaseCommands, shell: &Shell) -> anyhow::Result<()> {
    match cmd {
        CaseCommands::List => {
            let state = shell.enter(Route::Cases).await?;
            let org = state.profile.as_ref().and_then(|p| p.organization_id);
            let cases = match org {
                Some(org) if state.permissions().allows(Capability::ViewOrganizationCases) => {
                    shell
                        .services
                        .cases
                        .find(&Query::new().eq("organization_id", org).order("created_at", false))
                        .await?
                }
                _ => shell.services.cases.get_all().await?,
            };
            utils::output_list(&shell.format, "cases", &cases, "No cases yet", |case| {
                format!(
                    "{}  {:<10}{:<8}{}",
                    case.id.map(|id| id.to_string()).unwrap_or_default(),
                    case.case_type.as_str(),
                    case.priority.as_str(),
                    case.title
                )
            })
        }
        CaseCommands::New(args) => {
            let state = shell.enter(Route::NewCase).await?;
            let user_id: Option<Uuid> = state.user.as_ref().map(|u| u.id);
            let organization_id = state.profile.as_ref().and_then(|p| p.organization_id);

            let mut wizard = CaseIntakeWizard::new(shell.notifier());
            {
                let form = wizard.values_mut();
                form.case_title = args.title;
                form.case_type = args.case_type;
                form.priority = args.priority;
                form.due_date = args.due;
                form.client_first_name = args.first_name;
                form.client_last_name = args.last_name;
                form.client_email = args.email;
                form.client_phone = args.phone;
                form.client_date_of_birth = args.date_of_birth;
                form.client_nationality = args.nationality;
                form.client_address = args.address;
                form.description = args.description;
                form.entry_date = args.entry_date;
                form.current_status = args.current_status;
                form.previous_applications = args.previous_applications;
                form.notes = args.notes;
            }

            while !wizard.is_last_step() {
                let step = wizard.current_step();
                tracing::debug!(
                    "Step {}/{}: {}",
                    wizard.step_index() + 1,
                    CaseIntakeWizard::TOTAL_STEPS,
                    step.title()
                );
                if let Err(errors) = wizard.next() {
                    utils::output_field_errors(&shell.format, &errors)?;
                    return Err(anyhow::anyhow!("{} has invalid fields", step.title()));
                }
            }

            let cases = shell.services.cases.clone();
            let outcome = wizard
                .submit(|form| async move { cases.create(form.to_case(organization_id, user_id)?).await })
                .await;

            match outcome {
                SubmitOutcome::Submitted(case) => {
                    utils::output_success(
                        &shell.format,
                        &format!("Case '{}' created", case.title),
                        Some(serde_json::json!({ "case": case })),
                    )
                }
                SubmitOutcome::Invalid(errors) => {
                    utils::output_field_errors(&shell.format, &errors)?;
                    Err(anyhow::anyhow!("Case has invalid fields"))
                }
                SubmitOutcome::Failed(e) => Err(anyhow::anyhow!(e.user_message())),
            }
        }
    }
}
