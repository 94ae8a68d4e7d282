//! Row structs bridging Diesel and the domain types.
//!
//! Rows carry raw column types; conversion into domain entities validates
//! the string-typed enumeration columns, so a corrupt row surfaces as a
//! repository error instead of a bogus default.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::complaint::{Complaint, ComplaintCategory, ComplaintStatus, Priority};
use crate::domain::meter::{MeterKind, MeterReading, MeterType};
use crate::domain::notification::{Notification, Severity};
use crate::domain::user::{EmptyExternalIdError, ExternalId, User, UserId};

use super::schema::{complaint_categories, complaints, meter_readings, meter_types, notifications, users};

/// Raised when a stored enumeration or identity column fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt row: {0}")]
pub struct CorruptRowError(pub String);

impl From<EmptyExternalIdError> for CorruptRowError {
    fn from(error: EmptyExternalIdError) -> Self {
        Self(error.to_string())
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub apartment: Option<String>,
    pub building: Option<String>,
    pub street: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CorruptRowError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            external_id: ExternalId::new(row.external_id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            apartment: row.apartment,
            building: row.building,
            street: row.street,
            phone: row.phone,
            email: row.email,
            is_admin: row.is_admin,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_uuid(),
            external_id: user.external_id.as_ref().to_owned(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            apartment: user.apartment.clone(),
            building: user.building.clone(),
            street: user.street.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = meter_readings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReadingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meter_kind: String,
    pub value: f64,
    pub previous_value: Option<f64>,
    pub consumption: Option<f64>,
    pub notes: Option<String>,
    pub photo: Option<String>,
    pub is_verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReadingRow> for MeterReading {
    type Error = CorruptRowError;

    fn try_from(row: ReadingRow) -> Result<Self, Self::Error> {
        let kind = MeterKind::from_str(&row.meter_kind)
            .map_err(|error| CorruptRowError(error.to_string()))?;
        Ok(Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            kind,
            value: row.value,
            previous_value: row.previous_value,
            consumption: row.consumption,
            notes: row.notes,
            photo: row.photo,
            is_verified: row.is_verified,
            verified_by: row.verified_by,
            verified_at: row.verified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&MeterReading> for ReadingRow {
    fn from(reading: &MeterReading) -> Self {
        Self {
            id: reading.id,
            user_id: reading.user_id.as_uuid(),
            meter_kind: reading.kind.as_str().to_owned(),
            value: reading.value,
            previous_value: reading.previous_value,
            consumption: reading.consumption,
            notes: reading.notes.clone(),
            photo: reading.photo.clone(),
            is_verified: reading.is_verified,
            verified_by: reading.verified_by.clone(),
            verified_at: reading.verified_at,
            created_at: reading.created_at,
            updated_at: reading.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = complaints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ComplaintRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub response: Option<String>,
    pub resolution_notes: Option<String>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub actual_completion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ComplaintRow> for Complaint {
    type Error = CorruptRowError;

    fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
        let priority = Priority::from_str(&row.priority)
            .map_err(|error| CorruptRowError(error.to_string()))?;
        let status = ComplaintStatus::from_str(&row.status)
            .map_err(|error| CorruptRowError(error.to_string()))?;
        Ok(Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            title: row.title,
            description: row.description,
            category: row.category,
            priority,
            status,
            assigned_to: row.assigned_to,
            response: row.response,
            resolution_notes: row.resolution_notes,
            estimated_completion: row.estimated_completion,
            actual_completion: row.actual_completion,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Complaint> for ComplaintRow {
    fn from(complaint: &Complaint) -> Self {
        Self {
            id: complaint.id,
            user_id: complaint.user_id.as_uuid(),
            title: complaint.title.clone(),
            description: complaint.description.clone(),
            category: complaint.category.clone(),
            priority: complaint.priority.as_str().to_owned(),
            status: complaint.status.as_str().to_owned(),
            assigned_to: complaint.assigned_to.clone(),
            response: complaint.response.clone(),
            resolution_notes: complaint.resolution_notes.clone(),
            estimated_completion: complaint.estimated_completion,
            actual_completion: complaint.actual_completion,
            created_at: complaint.created_at,
            updated_at: complaint.updated_at,
        }
    }
}

/// Changeset applying the tracker's computed field changes.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = complaints)]
pub struct ComplaintChangesetRow {
    pub status: Option<String>,
    pub response: Option<String>,
    pub resolution_notes: Option<String>,
    pub assigned_to: Option<String>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub actual_completion: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applying a resident's profile patch.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct ProfileChangesetRow {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub apartment: Option<String>,
    pub building: Option<String>,
    pub street: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    pub id: Uuid,
    pub recipient: Uuid,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub sent_at: DateTime<Utc>,
    pub read_by: Vec<Uuid>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = CorruptRowError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let severity = Severity::from_str(&row.severity)
            .map_err(|error| CorruptRowError(error.to_string()))?;
        Ok(Self {
            id: row.id,
            recipient: UserId::from_uuid(row.recipient),
            title: row.title,
            message: row.message,
            severity,
            sent_at: row.sent_at,
            read_by: row.read_by.into_iter().map(UserId::from_uuid).collect(),
        })
    }
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            recipient: notification.recipient.as_uuid(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            severity: notification.severity.as_str().to_owned(),
            sent_at: notification.sent_at,
            read_by: notification
                .read_by
                .iter()
                .map(|user_id| user_id.as_uuid())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = meter_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MeterTypeRow {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl TryFrom<MeterTypeRow> for MeterType {
    type Error = CorruptRowError;

    fn try_from(row: MeterTypeRow) -> Result<Self, Self::Error> {
        let code = MeterKind::from_str(&row.code)
            .map_err(|error| CorruptRowError(error.to_string()))?;
        Ok(Self {
            code,
            name: row.name,
            unit: row.unit,
            description: row.description,
            is_active: row.is_active,
        })
    }
}

impl From<&MeterType> for MeterTypeRow {
    fn from(row: &MeterType) -> Self {
        Self {
            code: row.code.as_str().to_owned(),
            name: row.name.clone(),
            unit: row.unit.clone(),
            description: row.description.clone(),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = complaint_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ComplaintCategoryRow {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub sla_hours: i32,
    pub is_active: bool,
}

impl From<ComplaintCategoryRow> for ComplaintCategory {
    fn from(row: ComplaintCategoryRow) -> Self {
        Self {
            code: row.code,
            name: row.name,
            description: row.description,
            sla_hours: row.sla_hours,
            is_active: row.is_active,
        }
    }
}

impl From<&ComplaintCategory> for ComplaintCategoryRow {
    fn from(row: &ComplaintCategory) -> Self {
        Self {
            code: row.code.clone(),
            name: row.name.clone(),
            description: row.description.clone(),
            sla_hours: row.sla_hours,
            is_active: row.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{sample_notification, sample_reading, sample_user};

    #[test]
    fn user_rows_round_trip() {
        let user = sample_user(UserId::random());
        let row = UserRow::from(&user);
        let back = User::try_from(row).expect("valid row");
        assert_eq!(back, user);
    }

    #[test]
    fn reading_rows_round_trip() {
        let mut reading = sample_reading(UserId::random(), MeterKind::ColdWater, 12.0);
        reading.previous_value = Some(0.0);
        reading.consumption = Some(12.0);
        let row = ReadingRow::from(&reading);
        let back = MeterReading::try_from(row).expect("valid row");
        assert_eq!(back, reading);
    }

    #[test]
    fn corrupt_meter_kind_is_rejected() {
        let reading = sample_reading(UserId::random(), MeterKind::Gas, 1.0);
        let mut row = ReadingRow::from(&reading);
        row.meter_kind = "plasma".to_owned();
        assert!(MeterReading::try_from(row).is_err());
    }

    #[test]
    fn notification_rows_round_trip_the_read_set() {
        let mut notification = sample_notification(UserId::random());
        notification.read_by.push(UserId::random());
        let row = NotificationRow::from(&notification);
        let back = Notification::try_from(row).expect("valid row");
        assert_eq!(back.read_by, notification.read_by);
    }
}
