use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils, Shell};
use crate::guard::Route;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user, profile and permissions")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, shell: &Shell) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => utils::prompt("Password: ")?,
            };

            shell.settle().await;
            shell
                .bootstrap()
                .sign_in(&email, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            let state = shell.wait_until(|s| s.user.is_some() && !s.loading).await;
            utils::output_success(
                &shell.format,
                &format!("Signed in as {}", email),
                Some(json!({
                    "user": state.user,
                    "role": state.profile.as_ref().map(|p| p.role),
                })),
            )
        }
        AuthCommands::Logout => {
            shell.settle().await;
            shell
                .bootstrap()
                .sign_out()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            utils::output_success(&shell.format, "Signed out", None)
        }
        AuthCommands::Status => {
            let state = shell.settle().await;
            let message = match &state.user {
                Some(user) => format!(
                    "Signed in as {}",
                    user.email.as_deref().unwrap_or("unknown email")
                ),
                None if state.loading => "Session check did not finish".to_string(),
                None => "Not signed in".to_string(),
            };
            utils::output_success(
                &shell.format,
                &message,
                Some(json!({
                    "phase": format!("{:?}", state.phase),
                    "authenticated": state.is_authenticated(),
                    "expires_at": state.session.as_ref().map(|s| s.expires_at),
                })),
            )
        }
        AuthCommands::Whoami => {
            let state = shell.enter(Route::Profile).await?;
            let permissions: Vec<_> = state.permissions().iter().collect();
            utils::output_record(
                &shell.format,
                "whoami",
                &json!({
                    "id": state.user.as_ref().map(|u| u.id),
                    "email": state.user.as_ref().and_then(|u| u.email.clone()),
                    "name": state.profile.as_ref().map(|p| p.display_name().to_string()),
                    "role": state.profile.as_ref().map(|p| p.role),
                    "organization_id": state.profile.as_ref().and_then(|p| p.organization_id),
                    "permissions": permissions,
                }),
            )
        }
    }
}
