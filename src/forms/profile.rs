// forms/profile.rs - Edit the signed-in user's profile

use super::rules;
use super::{FieldErrors, SubmitMessages, Validate};
use crate::models::UserProfile;

pub const PROFILE_UPDATED: SubmitMessages = SubmitMessages {
    success_title: "Profile updated",
    success_description: "Your profile has been saved.",
    failure_title: "Failed to update profile",
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            phone: profile.phone.clone().unwrap_or_default(),
        }
    }

    /// Copy the edited fields onto an existing profile
    pub fn apply(&self, mut profile: UserProfile) -> UserProfile {
        profile.full_name = Some(self.full_name.trim().to_string());
        let phone = self.phone.trim();
        profile.phone = (!phone.is_empty()).then(|| phone.to_string());
        profile
    }
}

impl Validate for ProfileForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        rules::required_text(&mut errors, "full_name", "Full name", &self.full_name, 2);
        rules::optional_phone(&mut errors, "phone", &self.phone);
        errors
    }
}
