//! Port abstraction for meter-reading persistence adapters.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::meter::{MeterKind, MeterReading};
use crate::domain::user::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by reading repository adapters.
    pub enum ReadingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "reading repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "reading repository query failed: {message}",
    }
}

/// Administrative listing filter.
///
/// Date bounds are inclusive; both are interpreted as start-of-day, so the
/// upper bound admits rows created exactly at midnight of that date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingFilter {
    pub kind: Option<MeterKind>,
    pub user_id: Option<UserId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Append a reading to the chain.
    async fn insert(&self, reading: &MeterReading) -> Result<(), ReadingPersistenceError>;

    /// Fetch a reading by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MeterReading>, ReadingPersistenceError>;

    /// Chain head for `(user, kind)`: the most recent reading by creation
    /// time, if any.
    async fn latest_for(
        &self,
        user_id: UserId,
        kind: MeterKind,
    ) -> Result<Option<MeterReading>, ReadingPersistenceError>;

    /// Most recent reading for a user across every kind.
    async fn latest_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<MeterReading>, ReadingPersistenceError>;

    /// All of a user's readings, most recent first.
    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<MeterReading>, ReadingPersistenceError>;

    /// Filtered administrative listing joined with owning users, most
    /// recent first.
    async fn list_filtered(
        &self,
        filter: &ReadingFilter,
    ) -> Result<Vec<(MeterReading, User)>, ReadingPersistenceError>;

    /// Stamp the verification fields, returning the updated row when the
    /// reading exists.
    async fn apply_verification(
        &self,
        id: Uuid,
        verifier: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<MeterReading>, ReadingPersistenceError>;

    /// Total reading count.
    async fn count_all(&self) -> Result<i64, ReadingPersistenceError>;

    /// Reading count for one user.
    async fn count_for_user(&self, user_id: UserId) -> Result<i64, ReadingPersistenceError>;

    /// Per-user reading counts for the resident directory.
    async fn counts_by_user(&self) -> Result<Vec<(UserId, i64)>, ReadingPersistenceError>;
}
