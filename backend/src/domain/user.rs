//! Resident identity and profile model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque external identity (the messaging-platform chat identifier).
///
/// ## Invariants
/// - non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

/// Validation failure raised when constructing an [`ExternalId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyExternalIdError;

impl fmt::Display for EmptyExternalIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "external identity must not be empty")
    }
}

impl std::error::Error for EmptyExternalIdError {}

impl ExternalId {
    /// Validate and construct an [`ExternalId`].
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyExternalIdError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(EmptyExternalIdError);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for ExternalId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ExternalId> for String {
    fn from(value: ExternalId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ExternalId {
    type Error = EmptyExternalIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// Created on first successful external login and never hard-deleted;
/// deactivation flips `is_active` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalId,
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

impl User {
    /// Display name shown in admin annotations (verifier, assignee).
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }

    /// Postal address formatted for tabular exports.
    pub fn address(&self) -> String {
        let street = self.street.as_deref().unwrap_or("-");
        let building = self.building.as_deref().unwrap_or("-");
        let apartment = self.apartment.as_deref().unwrap_or("-");
        format!("{street} {building} {apartment}")
    }
}

/// Profile fields a resident may update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub apartment: Option<String>,
    pub building: Option<String>,
    pub street: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ProfilePatch {
    /// Whether the patch carries at least one field.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.apartment.is_none()
            && self.building.is_none()
            && self.street.is_none()
            && self.phone.is_none()
            && self.email.is_none()
    }
}
