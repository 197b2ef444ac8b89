use uuid::Uuid;

use super::{Repository, ServiceError};
use crate::models::{Organization, UserProfile};

/// Create an organization and make `owner` its administrator.
///
/// Returns the stored organization and the owner's updated profile.
pub async fn create_for_owner(
    organizations: &dyn Repository<Organization>,
    profiles: &dyn Repository<UserProfile>,
    owner: &UserProfile,
    mut organization: Organization,
) -> Result<(Organization, UserProfile), ServiceError> {
    organization.created_by = Some(owner.id);
    if organization.id.is_none() {
        organization.id = Some(Uuid::new_v4());
    }

    let created = organizations.create(organization).await?;
    let organization_id = created
        .id
        .ok_or_else(|| ServiceError::Rejected("Organization was stored without an id".to_string()))?;

    let mut profile = owner.clone();
    profile.organization_id = Some(organization_id);
    profile.is_organization_admin = true;
    profile.individual_mode = false;

    let profile = profiles.update(owner.id, profile).await?;
    tracing::info!("User {} now administers organization {}", owner.id, organization_id);
    Ok((created, profile))
}
