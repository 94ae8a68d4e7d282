//! Idempotent catalog seeding invoked once during process bootstrap.
//!
//! No runtime code depends on import-time side effects: seeding is an
//! explicit routine guarded by per-code existence checks, so repeated boots
//! never duplicate rows.

use tracing::info;

use super::Error;
use super::complaint::default_complaint_categories;
use super::meter::default_meter_types;
use super::ports::{CatalogPersistenceError, CatalogRepository};

fn map_catalog_error(error: CatalogPersistenceError) -> Error {
    Error::internal(format!("catalog repository failure: {error}"))
}

/// Insert any missing default catalog rows.
pub async fn seed_catalogs<C>(catalog: &C) -> Result<(), Error>
where
    C: CatalogRepository + ?Sized,
{
    let existing = catalog
        .meter_type_codes()
        .await
        .map_err(map_catalog_error)?;
    let mut seeded_types = 0_usize;
    for row in default_meter_types() {
        if !existing.iter().any(|code| code == row.code.as_str()) {
            catalog
                .insert_meter_type(&row)
                .await
                .map_err(map_catalog_error)?;
            seeded_types += 1;
        }
    }

    let existing = catalog
        .complaint_category_codes()
        .await
        .map_err(map_catalog_error)?;
    let mut seeded_categories = 0_usize;
    for row in default_complaint_categories() {
        if !existing.contains(&row.code) {
            catalog
                .insert_complaint_category(&row)
                .await
                .map_err(map_catalog_error)?;
            seeded_categories += 1;
        }
    }

    if seeded_types > 0 || seeded_categories > 0 {
        info!(seeded_types, seeded_categories, "seeded default catalogs");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meter::MeterKind;
    use crate::domain::ports::MockCatalogRepository;

    #[tokio::test]
    async fn empty_catalogs_receive_full_defaults() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_meter_type_codes().return_once(|| Ok(vec![]));
        catalog
            .expect_complaint_category_codes()
            .return_once(|| Ok(vec![]));
        catalog.expect_insert_meter_type().times(5).returning(|_| Ok(()));
        catalog
            .expect_insert_complaint_category()
            .times(5)
            .returning(|_| Ok(()));

        seed_catalogs(&catalog).await.expect("seeding succeeds");
    }

    #[tokio::test]
    async fn present_codes_are_not_reinserted() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_meter_type_codes().return_once(|| {
            Ok(MeterKind::ALL
                .iter()
                .map(|kind| kind.as_str().to_owned())
                .collect())
        });
        catalog
            .expect_complaint_category_codes()
            .return_once(|| Ok(vec!["plumbing".to_owned()]));
        catalog.expect_insert_meter_type().times(0);
        catalog
            .expect_insert_complaint_category()
            .times(4)
            .returning(|_| Ok(()));

        seed_catalogs(&catalog).await.expect("seeding succeeds");
    }
}
