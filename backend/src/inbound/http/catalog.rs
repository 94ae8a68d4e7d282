//! Catalog listing endpoints.
//!
//! ```text
//! GET /api/meter-types
//! GET /api/complaint-categories
//! ```

use actix_web::{get, web};

use crate::domain::Error;
use crate::domain::complaint::ComplaintCategory;
use crate::domain::meter::MeterType;
use crate::domain::ports::CatalogPersistenceError;

use super::error::ApiResult;
use super::state::HttpState;

fn map_catalog_error(error: CatalogPersistenceError) -> Error {
    Error::internal(format!("catalog repository failure: {error}"))
}

/// Active meter types.
#[utoipa::path(
    get,
    path = "/api/meter-types",
    responses((status = 200, description = "Meter type catalog", body = [MeterType])),
    tags = ["catalog"]
)]
#[get("/meter-types")]
pub async fn meter_types(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<MeterType>>> {
    let rows = state
        .catalog
        .list_meter_types()
        .await
        .map_err(map_catalog_error)?;
    Ok(web::Json(rows))
}

/// Active complaint categories with their SLA targets.
#[utoipa::path(
    get,
    path = "/api/complaint-categories",
    responses((status = 200, description = "Category catalog", body = [ComplaintCategory])),
    tags = ["catalog"]
)]
#[get("/complaint-categories")]
pub async fn complaint_categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ComplaintCategory>>> {
    let rows = state
        .catalog
        .list_complaint_categories()
        .await
        .map_err(map_catalog_error)?;
    Ok(web::Json(rows))
}
