//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BuildingRef, UserPersistenceError, UserRepository};
use crate::domain::user::{ExternalId, ProfilePatch, User, UserId};

use super::diesel_errors::{DbFailure, classify, classify_pool};
use super::models::{ProfileChangesetRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> UserPersistenceError {
    match failure {
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        DbFailure::Query(message) => UserPersistenceError::query(message),
        DbFailure::UniqueViolation(message) => {
            UserPersistenceError::duplicate_external_id(message)
        }
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(|error| UserPersistenceError::query(error.to_string()))
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.into_iter().map(row_to_user).collect()
}

fn profile_changeset(patch: &ProfilePatch) -> ProfileChangesetRow {
    ProfileChangesetRow {
        first_name: patch.first_name.clone(),
        last_name: patch.last_name.clone(),
        apartment: patch.apartment.clone(),
        building: patch.building.clone(),
        street: patch.street.clone(),
        phone: patch.phone.clone(),
        email: patch.email.clone(),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        diesel::insert_into(users::table)
            .values(UserRow::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_failure(classify(e)))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<UserRow> = users::table
            .filter(users::external_id.eq(external_id.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_user).transpose()
    }

    async fn update_profile(
        &self,
        id: UserId,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<UserRow> = diesel::update(users::table.find(id.as_uuid()))
            .set(profile_changeset(patch))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_user).transpose()
    }

    async fn list_active(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<UserRow> = users::table
            .filter(users::is_active.eq(true))
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows_to_users(rows)
    }

    async fn list_active_in_building(
        &self,
        building: &str,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<UserRow> = users::table
            .filter(users::is_active.eq(true))
            .filter(users::building.eq(building))
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows_to_users(rows)
    }

    async fn list_active_by_ids(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::is_active.eq(true))
            .filter(users::id.eq_any(uuids))
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows_to_users(rows)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<UserRow> = users::table
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows_to_users(rows)
    }

    async fn distinct_buildings(&self) -> Result<Vec<BuildingRef>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<(String, String)> = users::table
            .filter(users::building.is_not_null())
            .filter(users::street.is_not_null())
            .select((
                users::building.assume_not_null(),
                users::street.assume_not_null(),
            ))
            .distinct()
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        Ok(rows
            .into_iter()
            .map(|(building, street)| BuildingRef { building, street })
            .collect())
    }

    async fn count_all(&self) -> Result<i64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn count_active(&self) -> Result<i64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        users::table
            .filter(users::is_active.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_map_to_duplicate_external_id() {
        let failure = DbFailure::UniqueViolation("users_external_id_key".to_owned());
        assert!(matches!(
            map_failure(failure),
            UserPersistenceError::DuplicateExternalId { .. }
        ));
    }

    #[test]
    fn profile_changeset_only_carries_present_fields() {
        let patch = ProfilePatch {
            phone: Some("+7 900".to_owned()),
            ..ProfilePatch::default()
        };
        let changeset = profile_changeset(&patch);
        assert_eq!(changeset.phone.as_deref(), Some("+7 900"));
        assert!(changeset.first_name.is_none());
    }
}
