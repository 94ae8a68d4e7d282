//! Meter reading endpoints.
//!
//! ```text
//! GET  /api/meters/readings
//! POST /api/meters/readings/{kind}
//! GET  /api/admin/meter-readings
//! POST /api/admin/meter-readings/{id}/verify
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::meter::MeterReading;
use crate::domain::ports::{ReadingFilter, ReadingGroup, SubmitReading};
use crate::domain::user::{User, UserId};

use super::bearer::Authenticated;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{missing_field_error, parse_date, parse_meter_kind, parse_uuid};

/// Submission payload for one reading.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReadingRequest {
    pub value: Option<f64>,
    pub notes: Option<String>,
    /// Base64 photo payload, optionally `data:`-prefixed.
    pub photo: Option<String>,
}

/// Administrative listing filter parameters.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminReadingsQuery {
    pub meter_kind: Option<String>,
    pub user_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Administrative listing row with owner context.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminReadingRow {
    pub id: Uuid,
    pub user_name: String,
    pub user_apartment: Option<String>,
    pub user_building: Option<String>,
    pub meter_kind: String,
    pub value: f64,
    pub previous_value: Option<f64>,
    pub consumption: Option<f64>,
    pub is_verified: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<(MeterReading, User)> for AdminReadingRow {
    fn from((reading, owner): (MeterReading, User)) -> Self {
        Self {
            id: reading.id,
            user_name: owner.display_name(),
            user_apartment: owner.apartment,
            user_building: owner.building,
            meter_kind: reading.kind.to_string(),
            value: reading.value,
            previous_value: reading.previous_value,
            consumption: reading.consumption,
            is_verified: reading.is_verified,
            notes: reading.notes,
            created_at: reading.created_at,
        }
    }
}

fn parse_filter(query: AdminReadingsQuery) -> Result<ReadingFilter, crate::domain::Error> {
    Ok(ReadingFilter {
        kind: query
            .meter_kind
            .map(|raw| parse_meter_kind(&raw, "meterKind"))
            .transpose()?,
        user_id: query
            .user_id
            .map(|raw| parse_uuid(&raw, "userId").map(UserId::from_uuid))
            .transpose()?,
        from: query
            .date_from
            .map(|raw| parse_date(&raw, "dateFrom"))
            .transpose()?,
        to: query
            .date_to
            .map(|raw| parse_date(&raw, "dateTo"))
            .transpose()?,
    })
}

/// The authenticated resident's readings grouped by meter kind.
#[utoipa::path(
    get,
    path = "/api/meters/readings",
    responses(
        (status = 200, description = "Readings grouped by kind", body = [ReadingGroup]),
        (status = 401, description = "Unauthorised"),
    ),
    tags = ["meters"]
)]
#[get("/meters/readings")]
pub async fn list_readings(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<ReadingGroup>>> {
    let groups = state.ledger.readings_for(caller.0).await?;
    Ok(web::Json(groups))
}

/// Submit a reading for one meter kind.
#[utoipa::path(
    post,
    path = "/api/meters/readings/{kind}",
    request_body = SubmitReadingRequest,
    params(("kind" = String, Path, description = "Meter kind code")),
    responses(
        (status = 200, description = "Stored reading", body = MeterReading),
        (status = 400, description = "Missing or invalid value"),
        (status = 401, description = "Unauthorised"),
    ),
    tags = ["meters"]
)]
#[post("/meters/readings/{kind}")]
pub async fn submit_reading(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<SubmitReadingRequest>,
) -> ApiResult<web::Json<MeterReading>> {
    let kind = parse_meter_kind(&path.into_inner(), "kind")?;
    let payload = payload.into_inner();
    let value = payload.value.ok_or_else(|| missing_field_error("value"))?;

    let reading = state
        .ledger
        .submit(SubmitReading {
            user_id: caller.0,
            kind,
            value,
            notes: payload.notes.filter(|notes| !notes.trim().is_empty()),
            photo: payload.photo,
        })
        .await?;
    Ok(web::Json(reading))
}

/// Filtered administrative listing across all residents.
#[utoipa::path(
    get,
    path = "/api/admin/meter-readings",
    params(
        ("meterKind" = Option<String>, Query, description = "Meter kind code"),
        ("userId" = Option<String>, Query, description = "Owning user id"),
        ("dateFrom" = Option<String>, Query, description = "Inclusive lower bound (YYYY-MM-DD)"),
        ("dateTo" = Option<String>, Query, description = "Inclusive upper bound (YYYY-MM-DD)"),
    ),
    responses(
        (status = 200, description = "Readings with owner context", body = [AdminReadingRow]),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
    ),
    tags = ["admin"]
)]
#[get("/admin/meter-readings")]
pub async fn admin_readings(
    state: web::Data<HttpState>,
    caller: Authenticated,
    query: web::Query<AdminReadingsQuery>,
) -> ApiResult<web::Json<Vec<AdminReadingRow>>> {
    let filter = parse_filter(query.into_inner())?;
    let rows = state.ledger.readings_admin(caller.0, filter).await?;
    Ok(web::Json(rows.into_iter().map(AdminReadingRow::from).collect()))
}

/// Stamp a reading as verified.
#[utoipa::path(
    post,
    path = "/api/admin/meter-readings/{id}/verify",
    params(("id" = Uuid, Path, description = "Reading identifier")),
    responses(
        (status = 200, description = "Verified reading", body = MeterReading),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Reading not found"),
    ),
    tags = ["admin"]
)]
#[post("/admin/meter-readings/{id}/verify")]
pub async fn verify_reading(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<MeterReading>> {
    let reading = state.ledger.verify(caller.0, path.into_inner()).await?;
    Ok(web::Json(reading))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::domain::fixtures::{sample_reading, sample_user};
    use crate::domain::meter::MeterKind;
    use crate::inbound::http::state::test_support::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::http::header;
    use actix_web::{App, test};

    fn authed_ports() -> (MockPorts, UserId) {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .identity
            .expect_authenticate()
            .returning(move |_| Ok(user_id));
        (ports, user_id)
    }

    async fn spawn(
        ports: MockPorts,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .service(list_readings)
                .service(submit_reading)
                .service(admin_readings)
                .service(verify_reading),
        )
        .await
    }

    #[actix_web::test]
    async fn submissions_carry_the_parsed_kind() {
        let (mut ports, user_id) = authed_ports();
        ports
            .ledger
            .expect_submit()
            .withf(move |request: &SubmitReading| {
                request.user_id == user_id
                    && request.kind == MeterKind::Electricity
                    && request.value == 135.0
            })
            .return_once(|request| {
                let mut reading = sample_reading(request.user_id, request.kind, request.value);
                reading.previous_value = Some(100.0);
                reading.consumption = Some(35.0);
                Ok(reading)
            });

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/meters/readings/electricity")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({ "value": 135.0 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["consumption"], 35.0);
    }

    #[actix_web::test]
    async fn missing_value_is_a_validation_error() {
        let (mut ports, _) = authed_ports();
        ports.ledger.expect_submit().times(0);

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/meters/readings/gas")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({ "notes": "no value" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_kind_is_a_validation_error() {
        let (ports, _) = authed_ports();
        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/meters/readings/water")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({ "value": 1.0 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn admin_listing_parses_the_filter() {
        let (mut ports, _) = authed_ports();
        ports
            .ledger
            .expect_readings_admin()
            .withf(|_, filter: &ReadingFilter| {
                filter.kind == Some(MeterKind::Gas)
                    && filter.from.is_some()
                    && filter.to.is_none()
                    && filter.user_id.is_none()
            })
            .return_once(|_, _| {
                let owner = sample_user(UserId::random());
                Ok(vec![(sample_reading(owner.id, MeterKind::Gas, 8.0), owner)])
            });

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin/meter-readings?meterKind=gas&dateFrom=2024-05-01")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body[0]["userName"], "Anna Serova");
        assert_eq!(body[0]["meterKind"], "gas");
    }

    #[actix_web::test]
    async fn non_admin_verification_is_forbidden() {
        let (mut ports, _) = authed_ports();
        ports
            .ledger
            .expect_verify()
            .return_once(|_, _| Err(Error::forbidden("admin access required")));

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/admin/meter-readings/{}/verify", Uuid::new_v4()))
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
