//! PostgreSQL-backed `ComplaintRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::complaint::{Complaint, ComplaintStatus};
use crate::domain::ports::{ComplaintChanges, ComplaintPersistenceError, ComplaintRepository};
use crate::domain::user::{User, UserId};

use super::diesel_errors::{DbFailure, classify, classify_pool};
use super::models::{ComplaintChangesetRow, ComplaintRow, UserRow};
use super::pool::DbPool;
use super::schema::{complaints, users};

/// Diesel-backed implementation of the `ComplaintRepository` port.
#[derive(Clone)]
pub struct DieselComplaintRepository {
    pool: DbPool,
}

impl DieselComplaintRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> ComplaintPersistenceError {
    match failure {
        DbFailure::Connection(message) => ComplaintPersistenceError::connection(message),
        DbFailure::Query(message) | DbFailure::UniqueViolation(message) => {
            ComplaintPersistenceError::query(message)
        }
    }
}

fn row_to_complaint(row: ComplaintRow) -> Result<Complaint, ComplaintPersistenceError> {
    Complaint::try_from(row).map_err(|error| ComplaintPersistenceError::query(error.to_string()))
}

fn row_to_user(row: UserRow) -> Result<User, ComplaintPersistenceError> {
    User::try_from(row).map_err(|error| ComplaintPersistenceError::query(error.to_string()))
}

fn changeset(changes: &ComplaintChanges) -> ComplaintChangesetRow {
    ComplaintChangesetRow {
        status: changes.status.map(|status| status.as_str().to_owned()),
        response: changes.response.clone(),
        resolution_notes: changes.resolution_notes.clone(),
        assigned_to: changes.assigned_to.clone(),
        estimated_completion: changes.estimated_completion,
        actual_completion: changes.actual_completion,
        updated_at: changes.updated_at,
    }
}

#[async_trait]
impl ComplaintRepository for DieselComplaintRepository {
    async fn insert(&self, complaint: &Complaint) -> Result<(), ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        diesel::insert_into(complaints::table)
            .values(ComplaintRow::from(complaint))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_failure(classify(e)))
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Complaint>, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<ComplaintRow> = complaints::table
            .find(id)
            .select(ComplaintRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_complaint).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Complaint>, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<ComplaintRow> = complaints::table
            .filter(complaints::user_id.eq(user_id.as_uuid()))
            .order(complaints::created_at.desc())
            .select(ComplaintRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows.into_iter().map(row_to_complaint).collect()
    }

    async fn list_with_owners(
        &self,
    ) -> Result<Vec<(Complaint, User)>, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<(ComplaintRow, UserRow)> = complaints::table
            .inner_join(users::table)
            .order(complaints::created_at.desc())
            .select((ComplaintRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows.into_iter()
            .map(|(complaint, owner)| Ok((row_to_complaint(complaint)?, row_to_user(owner)?)))
            .collect()
    }

    async fn apply_changes(
        &self,
        id: Uuid,
        changes: &ComplaintChanges,
    ) -> Result<Option<Complaint>, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<ComplaintRow> = diesel::update(complaints::table.find(id))
            .set(changeset(changes))
            .returning(ComplaintRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_complaint).transpose()
    }

    async fn count_all(&self) -> Result<i64, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        complaints::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn count_with_status(
        &self,
        status: ComplaintStatus,
    ) -> Result<i64, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        complaints::table
            .filter(complaints::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn count_for_user(
        &self,
        user_id: UserId,
    ) -> Result<i64, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        complaints::table
            .filter(complaints::user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn count_for_user_with_status(
        &self,
        user_id: UserId,
        status: ComplaintStatus,
    ) -> Result<i64, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        complaints::table
            .filter(complaints::user_id.eq(user_id.as_uuid()))
            .filter(complaints::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn counts_by_user(&self) -> Result<Vec<(UserId, i64)>, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<(Uuid, i64)> = complaints::table
            .group_by(complaints::user_id)
            .select((complaints::user_id, count_star()))
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        Ok(rows
            .into_iter()
            .map(|(user_id, count)| (UserId::from_uuid(user_id), count))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn changeset_serialises_the_status_code() {
        let changes = ComplaintChanges {
            status: Some(ComplaintStatus::InProgress),
            response: None,
            resolution_notes: None,
            assigned_to: None,
            estimated_completion: None,
            actual_completion: None,
            updated_at: Utc::now(),
        };
        let row = changeset(&changes);
        assert_eq!(row.status.as_deref(), Some("in_progress"));
        assert!(row.response.is_none());
    }
}
