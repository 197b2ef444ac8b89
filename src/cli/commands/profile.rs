use clap::Subcommand;

use crate::cli::{utils, Shell};
use crate::forms::profile::PROFILE_UPDATED;
use crate::forms::{FormController, ProfileForm, SubmitOutcome};
use crate::guard::Route;

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "Show your profile")]
    Show,

    #[command(about = "Update your name or phone number")]
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

pub async fn handle(cmd: ProfileCommands, shell: &Shell) -> anyhow::Result<()> {
    let state = shell.enter(Route::Profile).await?;
    let profile = state
        .profile
        .ok_or_else(|| anyhow::anyhow!("Your profile has not been set up yet"))?;

    match cmd {
        ProfileCommands::Show => utils::output_record(&shell.format, "profile", &profile),
        ProfileCommands::Update { full_name, phone } => {
            let mut form = FormController::new(ProfileForm::from_profile(&profile), shell.notifier());
            if let Some(full_name) = full_name {
                form.values_mut().full_name = full_name;
            }
            if let Some(phone) = phone {
                form.values_mut().phone = phone;
            }

            let profiles = shell.services.profiles.clone();
            let id = profile.id;
            let outcome = form
                .submit(PROFILE_UPDATED, |values| async move {
                    profiles.update(id, values.apply(profile)).await
                })
                .await;

            match outcome {
                SubmitOutcome::Submitted(updated) => {
                    shell.bootstrap().refresh_profile().await;
                    utils::output_success(
                        &shell.format,
                        "Profile updated",
                        Some(serde_json::json!({ "profile": updated })),
                    )
                }
                SubmitOutcome::Invalid(errors) => {
                    utils::output_field_errors(&shell.format, &errors)?;
                    Err(anyhow::anyhow!("Profile has invalid fields"))
                }
                SubmitOutcome::Failed(e) => Err(anyhow::anyhow!(e.user_message())),
            }
        }
    }
}
