// models/mod.rs - Row types for the hosted backend's tables

pub mod calendar;
pub mod case;
pub mod document;
pub mod organization;
pub mod profile;

pub use calendar::CalendarEvent;
pub use case::{Case, CaseDetails, CaseStatus, CaseType, ClientInfo, Priority};
pub use document::{Document, DocumentType, FormTemplate};
pub use organization::Organization;
pub use profile::{AdminUser, Role, UserProfile};

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A row stored in one backend table.
///
/// The service layer is generic over this trait so the same repository code
/// serves every resource.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backend table name (also used as the resource key in configuration)
    const TABLE: &'static str;

    /// Primary key, `None` for rows that have not been persisted yet
    fn id(&self) -> Option<Uuid>;
}
