//! Port abstraction for the meter-type and complaint-category catalogs.
//!
//! Catalogs are seeded once at bootstrap and read-only afterwards from the
//! core's perspective.

use async_trait::async_trait;

use crate::domain::complaint::ComplaintCategory;
use crate::domain::meter::MeterType;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by catalog repository adapters.
    pub enum CatalogPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "catalog repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "catalog repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Active meter types in catalog order.
    async fn list_meter_types(&self) -> Result<Vec<MeterType>, CatalogPersistenceError>;

    /// Active complaint categories in catalog order.
    async fn list_complaint_categories(
        &self,
    ) -> Result<Vec<ComplaintCategory>, CatalogPersistenceError>;

    /// Codes already present in the meter-type catalog.
    async fn meter_type_codes(&self) -> Result<Vec<String>, CatalogPersistenceError>;

    /// Codes already present in the category catalog.
    async fn complaint_category_codes(&self) -> Result<Vec<String>, CatalogPersistenceError>;

    /// Insert one meter-type row.
    async fn insert_meter_type(&self, row: &MeterType) -> Result<(), CatalogPersistenceError>;

    /// Insert one category row.
    async fn insert_complaint_category(
        &self,
        row: &ComplaintCategory,
    ) -> Result<(), CatalogPersistenceError>;
}
