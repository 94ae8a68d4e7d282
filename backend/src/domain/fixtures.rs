//! Shared test fixtures for domain entities.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::complaint::{Complaint, ComplaintStatus, Priority};
use super::meter::{MeterKind, MeterReading};
use super::notification::{Notification, Severity};
use super::user::{ExternalId, User, UserId};

/// A fixed instant so assertions stay deterministic.
pub(crate) fn fixed_instant() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).single().expect("valid instant")
}

pub(crate) fn sample_user(id: UserId) -> User {
    User {
        id,
        external_id: ExternalId::new(format!("ext-{id}")).expect("external id"),
        first_name: "Anna".to_owned(),
        last_name: Some("Serova".to_owned()),
        username: Some("anna_s".to_owned()),
        apartment: Some("15".to_owned()),
        building: Some("3".to_owned()),
        street: Some("Sadovaya".to_owned()),
        phone: None,
        email: None,
        is_admin: false,
        is_active: true,
        created_at: fixed_instant(),
    }
}

pub(crate) fn sample_admin(id: UserId) -> User {
    let mut user = sample_user(id);
    user.first_name = "Pavel".to_owned();
    user.last_name = Some("Orlov".to_owned());
    user.is_admin = true;
    user
}

pub(crate) fn sample_reading(user_id: UserId, kind: MeterKind, value: f64) -> MeterReading {
    MeterReading {
        id: Uuid::new_v4(),
        user_id,
        kind,
        value,
        previous_value: None,
        consumption: None,
        notes: None,
        photo: None,
        is_verified: false,
        verified_by: None,
        verified_at: None,
        created_at: fixed_instant(),
        updated_at: fixed_instant(),
    }
}

pub(crate) fn sample_complaint(user_id: UserId) -> Complaint {
    Complaint {
        id: Uuid::new_v4(),
        user_id,
        title: "Leaking pipe".to_owned(),
        description: "Kitchen riser drips on the floor".to_owned(),
        category: "plumbing".to_owned(),
        priority: Priority::Medium,
        status: ComplaintStatus::New,
        assigned_to: None,
        response: None,
        resolution_notes: None,
        estimated_completion: None,
        actual_completion: None,
        created_at: fixed_instant(),
        updated_at: fixed_instant(),
    }
}

pub(crate) fn sample_notification(recipient: UserId) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        recipient,
        title: "Water outage".to_owned(),
        message: "Repairs until 18:00".to_owned(),
        severity: Severity::Warning,
        sent_at: fixed_instant(),
        read_by: Vec::new(),
    }
}
