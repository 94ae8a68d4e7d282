//! Response DTOs shared across HTTP handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::User;

/// Full user profile as returned to the authenticated resident.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
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

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_uuid(),
            external_id: user.external_id.into(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            apartment: user.apartment,
            building: user.building,
            street: user.street,
            phone: user.phone,
            email: user.email,
            is_admin: user.is_admin,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}
