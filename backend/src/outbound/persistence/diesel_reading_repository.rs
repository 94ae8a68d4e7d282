//! PostgreSQL-backed `ReadingRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::meter::MeterReading;
use crate::domain::ports::{ReadingFilter, ReadingPersistenceError, ReadingRepository};
use crate::domain::user::{User, UserId};

use super::diesel_errors::{DbFailure, classify, classify_pool};
use super::models::{ReadingRow, UserRow};
use super::pool::DbPool;
use super::schema::{meter_readings, users};

/// Diesel-backed implementation of the `ReadingRepository` port.
#[derive(Clone)]
pub struct DieselReadingRepository {
    pool: DbPool,
}

impl DieselReadingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> ReadingPersistenceError {
    match failure {
        DbFailure::Connection(message) => ReadingPersistenceError::connection(message),
        DbFailure::Query(message) | DbFailure::UniqueViolation(message) => {
            ReadingPersistenceError::query(message)
        }
    }
}

fn row_to_reading(row: ReadingRow) -> Result<MeterReading, ReadingPersistenceError> {
    MeterReading::try_from(row).map_err(|error| ReadingPersistenceError::query(error.to_string()))
}

fn row_to_user(row: UserRow) -> Result<User, ReadingPersistenceError> {
    User::try_from(row).map_err(|error| ReadingPersistenceError::query(error.to_string()))
}

/// Both filter bounds are inclusive and interpreted as start-of-day.
fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[async_trait]
impl ReadingRepository for DieselReadingRepository {
    async fn insert(&self, reading: &MeterReading) -> Result<(), ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        diesel::insert_into(meter_readings::table)
            .values(ReadingRow::from(reading))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_failure(classify(e)))
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<MeterReading>, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<ReadingRow> = meter_readings::table
            .find(id)
            .select(ReadingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_reading).transpose()
    }

    async fn latest_for(
        &self,
        user_id: UserId,
        kind: crate::domain::meter::MeterKind,
    ) -> Result<Option<MeterReading>, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<ReadingRow> = meter_readings::table
            .filter(meter_readings::user_id.eq(user_id.as_uuid()))
            .filter(meter_readings::meter_kind.eq(kind.as_str()))
            .order(meter_readings::created_at.desc())
            .select(ReadingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_reading).transpose()
    }

    async fn latest_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<MeterReading>, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<ReadingRow> = meter_readings::table
            .filter(meter_readings::user_id.eq(user_id.as_uuid()))
            .order(meter_readings::created_at.desc())
            .select(ReadingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_reading).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<MeterReading>, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<ReadingRow> = meter_readings::table
            .filter(meter_readings::user_id.eq(user_id.as_uuid()))
            .order(meter_readings::created_at.desc())
            .select(ReadingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows.into_iter().map(row_to_reading).collect()
    }

    async fn list_filtered(
        &self,
        filter: &ReadingFilter,
    ) -> Result<Vec<(MeterReading, User)>, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let mut query = meter_readings::table
            .inner_join(users::table)
            .select((ReadingRow::as_select(), UserRow::as_select()))
            .into_boxed();
        if let Some(kind) = filter.kind {
            query = query.filter(meter_readings::meter_kind.eq(kind.as_str()));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(meter_readings::user_id.eq(user_id.as_uuid()));
        }
        if let Some(from) = filter.from {
            query = query.filter(meter_readings::created_at.ge(start_of_day(from)));
        }
        if let Some(to) = filter.to {
            query = query.filter(meter_readings::created_at.le(start_of_day(to)));
        }
        let rows: Vec<(ReadingRow, UserRow)> = query
            .order(meter_readings::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows.into_iter()
            .map(|(reading, owner)| Ok((row_to_reading(reading)?, row_to_user(owner)?)))
            .collect()
    }

    async fn apply_verification(
        &self,
        id: Uuid,
        verifier: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<MeterReading>, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let row: Option<ReadingRow> = diesel::update(meter_readings::table.find(id))
            .set((
                meter_readings::is_verified.eq(true),
                meter_readings::verified_by.eq(verifier),
                meter_readings::verified_at.eq(at),
                meter_readings::updated_at.eq(at),
            ))
            .returning(ReadingRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify(e)))?;
        row.map(row_to_reading).transpose()
    }

    async fn count_all(&self) -> Result<i64, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        meter_readings::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<i64, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        meter_readings::table
            .filter(meter_readings::user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn counts_by_user(&self) -> Result<Vec<(UserId, i64)>, ReadingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<(Uuid, i64)> = meter_readings::table
            .group_by(meter_readings::user_id)
            .select((meter_readings::user_id, count_star()))
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

    #[test]
    fn filter_bounds_are_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 14).expect("valid date");
        assert_eq!(
            start_of_day(date).to_rfc3339(),
            "2024-05-14T00:00:00+00:00"
        );
    }

    #[test]
    fn unique_violations_collapse_into_query_failures() {
        let failure = DbFailure::UniqueViolation("pk".to_owned());
        assert!(matches!(
            map_failure(failure),
            ReadingPersistenceError::Query { .. }
        ));
    }
}
