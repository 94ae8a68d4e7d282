//! PostgreSQL-backed `NotificationRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::user::UserId;

use super::diesel_errors::{DbFailure, classify, classify_pool};
use super::models::NotificationRow;
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> NotificationPersistenceError {
    match failure {
        DbFailure::Connection(message) => NotificationPersistenceError::connection(message),
        DbFailure::Query(message) | DbFailure::UniqueViolation(message) => {
            NotificationPersistenceError::query(message)
        }
    }
}

fn row_to_notification(
    row: NotificationRow,
) -> Result<Notification, NotificationPersistenceError> {
    Notification::try_from(row)
        .map_err(|error| NotificationPersistenceError::query(error.to_string()))
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(
        &self,
        notification: &Notification,
    ) -> Result<(), NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        diesel::insert_into(notifications::table)
            .values(NotificationRow::from(notification))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_failure(classify(e)))
    }

    async fn list_for_recipient(
        &self,
        recipient: UserId,
        limit: i64,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::recipient.eq(recipient.as_uuid()))
            .order(notifications::sent_at.desc())
            .limit(limit)
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows.into_iter().map(row_to_notification).collect()
    }

    async fn mark_read(
        &self,
        id: Uuid,
        user_id: UserId,
    ) -> Result<bool, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<NotificationRow> = notifications::table
            .find(id)
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        let Some(row) = row else {
            return Ok(false);
        };
        let mut notification = row_to_notification(row)?;
        // Set semantics live on the domain type; only a first mark writes.
        if notification.mark_read_by(user_id) {
            let read_by: Vec<Uuid> = notification
                .read_by
                .iter()
                .map(|reader| reader.as_uuid())
                .collect();
            diesel::update(notifications::table.find(id))
                .set(notifications::read_by.eq(read_by))
                .execute(&mut conn)
                .await
                .map_err(|e| map_failure(classify(e)))?;
        }
        Ok(true)
    }

    async fn count_all(&self) -> Result<i64, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        notifications::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn count_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<i64, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        notifications::table
            .filter(notifications::sent_at.ge(since))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }
}
