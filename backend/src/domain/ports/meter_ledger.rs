//! Driving port for the meter ledger use-cases.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::meter::{MeterKind, MeterReading};
use crate::domain::user::{User, UserId};

use super::reading_repository::ReadingFilter;

/// Submission payload for one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReading {
    pub user_id: UserId,
    pub kind: MeterKind,
    pub value: f64,
    pub notes: Option<String>,
    /// Base64 photo payload, optionally `data:`-prefixed.
    pub photo: Option<String>,
}

/// A user's readings for one meter kind, most recent first.
#[derive(Debug, Clone, PartialEq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingGroup {
    pub kind: MeterKind,
    pub readings: Vec<MeterReading>,
}

/// Domain use-case port for the append-only reading ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeterLedger: Send + Sync {
    /// Append a reading, deriving `previous_value`/`consumption` from the
    /// chain head. Submissions are serialised per `(user, kind)`.
    async fn submit(&self, request: SubmitReading) -> Result<MeterReading, Error>;

    /// Stamp a reading as verified. Requires the administrative flag; a
    /// second call is a no-op preserving the first stamp.
    async fn verify(&self, admin_id: UserId, reading_id: Uuid) -> Result<MeterReading, Error>;

    /// A user's readings grouped by kind, most recent first per group.
    async fn readings_for(&self, user_id: UserId) -> Result<Vec<ReadingGroup>, Error>;

    /// Filtered administrative listing joined with owners.
    async fn readings_admin(
        &self,
        admin_id: UserId,
        filter: ReadingFilter,
    ) -> Result<Vec<(MeterReading, User)>, Error>;
}
