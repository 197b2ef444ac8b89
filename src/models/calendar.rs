use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Record;

/// Appointment or deadline shown on the calendar view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub case_id: Option<Uuid>,
}

impl Record for CalendarEvent {
    const TABLE: &'static str = "calendar_events";

    fn id(&self) -> Option<Uuid> {
        self.id
    }
}
