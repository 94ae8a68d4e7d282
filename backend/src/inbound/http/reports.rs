//! Dashboard and export endpoints.
//!
//! ```text
//! GET /api/users/stats
//! GET /api/admin/stats
//! GET /api/admin/users
//! GET /api/admin/buildings
//! GET /api/admin/export/{kind}
//! ```

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    AdminStats, BuildingRef, ExportKind, ResidentRow, TabularReport, UserStats,
};

use super::bearer::Authenticated;
use super::error::ApiResult;
use super::state::HttpState;

/// Building entry for the admin broadcast form.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingView {
    pub id: String,
    pub number: String,
    pub street: String,
    pub full_address: String,
}

impl From<BuildingRef> for BuildingView {
    fn from(value: BuildingRef) -> Self {
        let full_address = format!("{}, {}", value.street, value.building);
        Self {
            id: value.building.clone(),
            number: value.building,
            street: value.street,
            full_address,
        }
    }
}

/// Resident directory row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResidentView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub address: String,
    pub readings_count: i64,
    pub complaints_count: i64,
}

impl From<ResidentRow> for ResidentView {
    fn from(row: ResidentRow) -> Self {
        Self {
            id: row.user.id.as_uuid(),
            address: row.user.address(),
            first_name: row.user.first_name,
            last_name: row.user.last_name,
            username: row.user.username,
            readings_count: row.readings_count,
            complaints_count: row.complaints_count,
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn render_csv(report: &TabularReport) -> String {
    let mut out = String::new();
    out.push_str(&report.headers.join(","));
    out.push('\n');
    for row in &report.rows {
        let line: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Dashboard counters for the authenticated resident.
#[utoipa::path(
    get,
    path = "/api/users/stats",
    responses(
        (status = 200, description = "Resident counters", body = UserStats),
        (status = 401, description = "Unauthorised"),
    ),
    tags = ["users"]
)]
#[get("/users/stats")]
pub async fn user_stats(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<UserStats>> {
    let stats = state.reports.user_stats(caller.0).await?;
    Ok(web::Json(stats))
}

/// System-wide counters; administrative.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "System counters", body = AdminStats),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
    ),
    tags = ["admin"]
)]
#[get("/admin/stats")]
pub async fn admin_stats(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<AdminStats>> {
    let stats = state.reports.admin_stats(caller.0).await?;
    Ok(web::Json(stats))
}

/// Resident directory with activity counters; administrative.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Resident directory", body = [ResidentView]),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
    ),
    tags = ["admin"]
)]
#[get("/admin/users")]
pub async fn admin_users(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<ResidentView>>> {
    let rows = state.reports.residents(caller.0).await?;
    Ok(web::Json(rows.into_iter().map(ResidentView::from).collect()))
}

/// Distinct buildings for audience selection; administrative.
#[utoipa::path(
    get,
    path = "/api/admin/buildings",
    responses(
        (status = 200, description = "Known buildings", body = [BuildingView]),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
    ),
    tags = ["admin"]
)]
#[get("/admin/buildings")]
pub async fn admin_buildings(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<BuildingView>>> {
    let buildings = state.reports.buildings(caller.0).await?;
    Ok(web::Json(
        buildings.into_iter().map(BuildingView::from).collect(),
    ))
}

/// Tabular CSV export; administrative.
#[utoipa::path(
    get,
    path = "/api/admin/export/{kind}",
    params(("kind" = String, Path, description = "complaints, meter_readings or users")),
    responses(
        (status = 200, description = "CSV payload", content_type = "text/csv"),
        (status = 400, description = "Unknown export kind"),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
    ),
    tags = ["admin"]
)]
#[get("/admin/export/{kind}")]
pub async fn export(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw_kind = path.into_inner();
    let kind: ExportKind = raw_kind
        .parse()
        .map_err(|_| crate::domain::Error::invalid_request(format!(
            "unknown export kind: {raw_kind}"
        )))?;
    let report = state.reports.export(caller.0, kind).await?;
    let filename = format!(
        "{}_{}.csv",
        report.title,
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/csv; charset=utf-8"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(render_csv(&report)))
}
