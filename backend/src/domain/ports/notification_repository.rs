//! Port abstraction for notification persistence adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by notification repository adapters.
    pub enum NotificationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert one per-recipient row.
    async fn insert(&self, notification: &Notification)
    -> Result<(), NotificationPersistenceError>;

    /// A recipient's rows, most recent first, capped at `limit`.
    async fn list_for_recipient(
        &self,
        recipient: UserId,
        limit: i64,
    ) -> Result<Vec<Notification>, NotificationPersistenceError>;

    /// Append the user to the read-by set unless already present.
    ///
    /// Returns `false` when the row does not exist. Re-marking an already
    /// read row succeeds without growing the set.
    async fn mark_read(
        &self,
        id: Uuid,
        user_id: UserId,
    ) -> Result<bool, NotificationPersistenceError>;

    /// Total row count.
    async fn count_all(&self) -> Result<i64, NotificationPersistenceError>;

    /// Rows sent at or after the given instant.
    async fn count_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<i64, NotificationPersistenceError>;
}
