// auth/permissions.rs - Capability set derived from a profile
//
// Screens ask `permissions.allows(Capability::X)` instead of comparing role
// strings themselves.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{Role, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDashboard,
    CreateCases,
    UploadDocuments,
    ViewOrganizationCases,
    CreateOrganization,
    ManageOrganization,
    ManageUsers,
    ManageDocumentTypes,
    ManageFormTemplates,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Permissions {
    capabilities: BTreeSet<Capability>,
}

impl Permissions {
    /// Nothing allowed (signed out)
    pub fn none() -> Self {
        Self::default()
    }

    /// Capabilities for an authenticated user. A missing profile gets the
    /// applicant baseline.
    pub fn for_profile(profile: Option<&UserProfile>) -> Self {
        use Capability::*;

        let mut caps = BTreeSet::from([ViewDashboard, CreateCases, UploadDocuments]);

        let Some(profile) = profile else {
            return Self { capabilities: caps };
        };

        match profile.role {
            Role::Applicant => {}
            Role::Representative => {
                if profile.organization_id.is_some() {
                    caps.insert(ViewOrganizationCases);
                } else if !profile.individual_mode {
                    caps.insert(CreateOrganization);
                }
            }
            Role::Admin => {
                caps.extend([
                    ViewOrganizationCases,
                    CreateOrganization,
                    ManageOrganization,
                    ManageUsers,
                    ManageDocumentTypes,
                    ManageFormTemplates,
                ]);
            }
        }

        if profile.is_organization_admin && profile.organization_id.is_some() {
            caps.extend([ViewOrganizationCases, ManageOrganization]);
        }

        Self { capabilities: caps }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(role: Role) -> UserProfile {
        UserProfile::new(Uuid::new_v4(), role)
    }

    #[test]
    fn signed_out_has_nothing() {
        assert!(!Permissions::none().allows(Capability::ViewDashboard));
    }

    #[test]
    fn missing_profile_gets_baseline() {
        let p = Permissions::for_profile(None);
        assert!(p.allows(Capability::CreateCases));
        assert!(!p.allows(Capability::ManageUsers));
    }

    #[test]
    fn admin_manages_everything() {
        let p = Permissions::for_profile(Some(&profile(Role::Admin)));
        assert!(p.allows(Capability::ManageUsers));
        assert!(p.allows(Capability::ManageDocumentTypes));
        assert!(p.allows(Capability::ManageFormTemplates));
    }

    #[test]
    fn representative_without_org_may_create_one() {
        let rep = profile(Role::Representative);
        assert!(Permissions::for_profile(Some(&rep)).allows(Capability::CreateOrganization));

        let mut solo = rep.clone();
        solo.individual_mode = true;
        assert!(!Permissions::for_profile(Some(&solo)).allows(Capability::CreateOrganization));
    }

    #[test]
    fn organization_admin_flag_requires_membership() {
        let mut rep = profile(Role::Representative);
        rep.is_organization_admin = true;
        assert!(!Permissions::for_profile(Some(&rep)).allows(Capability::ManageOrganization));

        rep.organization_id = Some(Uuid::new_v4());
        let p = Permissions::for_profile(Some(&rep));
        assert!(p.allows(Capability::ManageOrganization));
        assert!(p.allows(Capability::ViewOrganizationCases));
        assert!(!p.allows(Capability::ManageUsers));
    }
}
