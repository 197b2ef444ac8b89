// handlers/mod.rs - HTTP handlers
//
// Public: service banner and health probe.
// Admin: bearer token required, caller's profile must carry the admin role.

pub mod admin;
pub mod public;

use std::sync::Arc;

use crate::backend::{AdminClient, AuthClient, BackendHandles};
use crate::models::UserProfile;
use crate::services::{Repository, Services};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthClient>,
    pub admin: Arc<dyn AdminClient>,
    pub profiles: Arc<dyn Repository<UserProfile>>,
}

impl AppState {
    pub fn new(backend: &BackendHandles, services: &Services) -> Self {
        Self {
            auth: backend.auth.clone(),
            admin: backend.admin.clone(),
            profiles: services.profiles.clone(),
        }
    }
}
