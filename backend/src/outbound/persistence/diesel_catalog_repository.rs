//! PostgreSQL-backed `CatalogRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::complaint::ComplaintCategory;
use crate::domain::meter::MeterType;
use crate::domain::ports::{CatalogPersistenceError, CatalogRepository};

use super::diesel_errors::{DbFailure, classify, classify_pool};
use super::models::{ComplaintCategoryRow, MeterTypeRow};
use super::pool::DbPool;
use super::schema::{complaint_categories, meter_types};

/// Diesel-backed implementation of the `CatalogRepository` port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> CatalogPersistenceError {
    match failure {
        DbFailure::Connection(message) => CatalogPersistenceError::connection(message),
        DbFailure::Query(message) | DbFailure::UniqueViolation(message) => {
            CatalogPersistenceError::query(message)
        }
    }
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn list_meter_types(&self) -> Result<Vec<MeterType>, CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<MeterTypeRow> = meter_types::table
            .filter(meter_types::is_active.eq(true))
            .select(MeterTypeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        rows.into_iter()
            .map(|row| {
                MeterType::try_from(row)
                    .map_err(|error| CatalogPersistenceError::query(error.to_string()))
            })
            .collect()
    }

    async fn list_complaint_categories(
        &self,
    ) -> Result<Vec<ComplaintCategory>, CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        let rows: Vec<ComplaintCategoryRow> = complaint_categories::table
            .filter(complaint_categories::is_active.eq(true))
            .select(ComplaintCategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))?;
        Ok(rows.into_iter().map(ComplaintCategory::from).collect())
    }

    async fn meter_type_codes(&self) -> Result<Vec<String>, CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        meter_types::table
            .select(meter_types::code)
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn complaint_category_codes(&self) -> Result<Vec<String>, CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        complaint_categories::table
            .select(complaint_categories::code)
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify(e)))
    }

    async fn insert_meter_type(&self, row: &MeterType) -> Result<(), CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        diesel::insert_into(meter_types::table)
            .values(MeterTypeRow::from(row))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_failure(classify(e)))
    }

    async fn insert_complaint_category(
        &self,
        row: &ComplaintCategory,
    ) -> Result<(), CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool(e)))?;
        diesel::insert_into(complaint_categories::table)
            .values(ComplaintCategoryRow::from(row))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_failure(classify(e)))
    }
}
