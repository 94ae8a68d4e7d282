//! Complaint ticket model and status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Complaint lifecycle states.
///
/// `New` is initial; `Resolved`, `Rejected` and `Closed` are terminal.
/// Transitions happen only through administrative updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    New,
    InProgress,
    Resolved,
    Rejected,
    Closed,
}

impl ComplaintStatus {
    /// Stable wire/storage code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure parsing a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatusError(pub String);

impl fmt::Display for UnknownStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown complaint status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatusError {}

impl FromStr for ComplaintStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            "closed" => Ok(Self::Closed),
            other => Err(UnknownStatusError(other.to_owned())),
        }
    }
}

/// Complaint urgency chosen by the reporting resident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Stable wire/storage code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure parsing a priority code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriorityError(pub String);

impl fmt::Display for UnknownPriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority: {}", self.0)
    }
}

impl std::error::Error for UnknownPriorityError {}

impl FromStr for Priority {
    type Err = UnknownPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(UnknownPriorityError(other.to_owned())),
        }
    }
}

/// A resident trouble ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    /// References a `ComplaintCategory` catalog code.
    pub category: String,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub assigned_to: Option<String>,
    pub response: Option<String>,
    pub resolution_notes: Option<String>,
    pub estimated_completion: Option<DateTime<Utc>>,
    /// Stamped exactly once, on the first transition into `Resolved`.
    pub actual_completion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrative patch; each present field is applied independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintUpdate {
    pub status: Option<ComplaintStatus>,
    pub response: Option<String>,
    pub resolution_notes: Option<String>,
    pub assigned_to: Option<String>,
    pub estimated_completion: Option<DateTime<Utc>>,
}

impl ComplaintUpdate {
    /// Whether the patch carries at least one field.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.response.is_none()
            && self.resolution_notes.is_none()
            && self.assigned_to.is_none()
            && self.estimated_completion.is_none()
    }
}

/// Catalog row describing a complaint category and its response target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintCategory {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Target response time, informational only.
    pub sla_hours: i32,
    pub is_active: bool,
}

/// Default catalog seeded on first boot with an empty categories table.
pub fn default_complaint_categories() -> Vec<ComplaintCategory> {
    let row = |code: &str, name: &str, description: &str, sla_hours: i32| ComplaintCategory {
        code: code.to_owned(),
        name: name.to_owned(),
        description: Some(description.to_owned()),
        sla_hours,
        is_active: true,
    };
    vec![
        row("plumbing", "Plumbing", "Water supply and drainage problems", 4),
        row("electricity", "Electricity", "Power supply problems", 2),
        row("cleaning", "Cleaning", "Common area cleaning problems", 24),
        row("noise", "Noise", "Noise complaints", 48),
        row("other", "Other", "Anything else", 72),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("new", ComplaintStatus::New)]
    #[case("in_progress", ComplaintStatus::InProgress)]
    #[case("resolved", ComplaintStatus::Resolved)]
    #[case("rejected", ComplaintStatus::Rejected)]
    #[case("closed", ComplaintStatus::Closed)]
    fn status_codes_round_trip(#[case] code: &str, #[case] status: ComplaintStatus) {
        assert_eq!(code.parse::<ComplaintStatus>(), Ok(status));
        assert_eq!(status.as_str(), code);
    }

    #[rstest]
    #[case("low", Priority::Low)]
    #[case("medium", Priority::Medium)]
    #[case("high", Priority::High)]
    #[case("urgent", Priority::Urgent)]
    fn priority_codes_round_trip(#[case] code: &str, #[case] priority: Priority) {
        assert_eq!(code.parse::<Priority>(), Ok(priority));
        assert_eq!(priority.as_str(), code);
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn empty_update_reports_itself() {
        assert!(ComplaintUpdate::default().is_empty());
        let update = ComplaintUpdate {
            response: Some("on it".to_owned()),
            ..ComplaintUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn default_categories_carry_sla_targets() {
        let catalog = default_complaint_categories();
        let plumbing = catalog
            .iter()
            .find(|row| row.code == "plumbing")
            .expect("plumbing category");
        assert_eq!(plumbing.sla_hours, 4);
    }
}
