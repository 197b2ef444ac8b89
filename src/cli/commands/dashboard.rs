use serde_json::json;

use crate::auth::Capability;
use crate::cli::{utils, Shell};
use crate::guard::Route;

/// Counts and next events for the signed-in user
pub async fn handle(shell: &Shell) -> anyhow::Result<()> {
    let state = shell.enter(Route::Dashboard).await?;
    let permissions = state.permissions();

    let (cases, documents, mut events) = futures::try_join!(
        shell.services.cases.get_all(),
        shell.services.documents.get_all(),
        shell.services.calendar.get_all(),
    )?;
    events.sort_by_key(|e| e.starts_at);
    events.truncate(3);

    let name = state
        .profile
        .as_ref()
        .map(|p| p.display_name().to_string())
        .or_else(|| state.user.as_ref().and_then(|u| u.email.clone()))
        .unwrap_or_default();

    let summary = json!({
        "welcome": name,
        "cases": cases.len(),
        "documents": documents.len(),
        "upcoming": events,
        "can_create_organization": permissions.allows(Capability::CreateOrganization),
        "is_admin": permissions.allows(Capability::ManageUsers),
    });
    utils::output_record(&shell.format, "dashboard", &summary)
}
