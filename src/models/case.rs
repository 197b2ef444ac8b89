use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Asylum,
    FamilyReunification,
    WorkPermit,
    StudentVisa,
    PermanentResidence,
    Citizenship,
    Other,
}

impl CaseType {
    pub const ALL: [CaseType; 7] = [
        CaseType::Asylum,
        CaseType::FamilyReunification,
        CaseType::WorkPermit,
        CaseType::StudentVisa,
        CaseType::PermanentResidence,
        CaseType::Citizenship,
        CaseType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Asylum => "asylum",
            CaseType::FamilyReunification => "family_reunification",
            CaseType::WorkPermit => "work_permit",
            CaseType::StudentVisa => "student_visa",
            CaseType::PermanentResidence => "permanent_residence",
            CaseType::Citizenship => "citizenship",
            CaseType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Open,
    InProgress,
    PendingDocuments,
    Submitted,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

/// Client section of a case, stored as a nested object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Background section of a case, stored as a nested object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CaseDetails {
    pub description: String,
    #[serde(default)]
    pub entry_date: Option<String>,
    #[serde(default)]
    pub current_status: Option<String>,
    #[serde(default)]
    pub previous_applications: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    pub case_type: CaseType,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub priority: Priority,
    pub client_info: ClientInfo,
    pub case_details: CaseDetails,
    /// Formatted as `yyyy-MM-dd`
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Case {
    pub fn due(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

impl Record for Case {
    const TABLE: &'static str = "cases";

    fn id(&self) -> Option<Uuid> {
        self.id
    }
}
