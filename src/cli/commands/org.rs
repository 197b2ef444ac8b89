use clap::Subcommand;

use crate::auth::Capability;
use crate::cli::{utils, Shell};
use crate::forms::organization::ORGANIZATION_CREATED;
use crate::forms::{FormController, OrganizationForm, SubmitOutcome};
use crate::guard::Route;
use crate::services::create_for_owner;

#[derive(Subcommand)]
pub enum OrgCommands {
    #[command(about = "Show your organization")]
    Show,

    #[command(about = "Create an organization and become its administrator")]
    Create {
        #[arg(help = "Organization name")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
    },
}

pub async fn handle(cmd: OrgCommands, shell: &Shell) -> anyhow::Result<()> {
    match cmd {
        OrgCommands::Show => {
            let state = shell.enter(Route::Dashboard).await?;
            let org_id = state
                .profile
                .as_ref()
                .and_then(|p| p.organization_id)
                .ok_or_else(|| anyhow::anyhow!("You do not belong to an organization"))?;
            match shell.services.organizations.get_by_id(org_id).await? {
                Some(org) => utils::output_record(&shell.format, "organization", &org),
                None => Err(anyhow::anyhow!("Organization {} not found", org_id)),
            }
        }
        OrgCommands::Create {
            name,
            description,
            email,
            phone,
            address,
        } => {
            let state = shell.enter(Route::Dashboard).await?;
            if !state.permissions().allows(Capability::CreateOrganization) {
                return Err(anyhow::anyhow!("Your account cannot create an organization"));
            }
            let owner = state
                .profile
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Your profile has not been set up yet"))?;

            let mut form = FormController::new(OrganizationForm::default(), shell.notifier());
            *form.values_mut() = OrganizationForm {
                name,
                description,
                email,
                phone,
                address,
            };

            let organizations = shell.services.organizations.clone();
            let profiles = shell.services.profiles.clone();
            let outcome = form
                .submit(ORGANIZATION_CREATED, |values| async move {
                    let org = values.to_organization(owner.id);
                    create_for_owner(organizations.as_ref(), profiles.as_ref(), &owner, org).await
                })
                .await;

            match outcome {
                SubmitOutcome::Submitted((org, _profile)) => {
                    shell.bootstrap().refresh_profile().await;
                    utils::output_success(
                        &shell.format,
                        &format!("Organization '{}' created", org.name),
                        Some(serde_json::json!({ "organization": org })),
                    )
                }
                SubmitOutcome::Invalid(errors) => {
                    utils::output_field_errors(&shell.format, &errors)?;
                    Err(anyhow::anyhow!("Organization has invalid fields"))
                }
                SubmitOutcome::Failed(e) => Err(anyhow::anyhow!(e.user_message())),
            }
        }
    }
}
