//! Complaint endpoints.
//!
//! ```text
//! GET  /api/complaints
//! POST /api/complaints
//! GET  /api/admin/complaints
//! PUT  /api/admin/complaints/{id}
//! ```

use actix_web::{get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::complaint::{Complaint, ComplaintUpdate, Priority};
use crate::domain::ports::CreateComplaint;
use crate::domain::user::User;

use super::bearer::Authenticated;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{parse_priority, parse_rfc3339, parse_status};

/// Creation payload for one complaint.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// Administrative patch payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplaintRequest {
    pub status: Option<String>,
    pub response: Option<String>,
    pub resolution_notes: Option<String>,
    pub assigned_to: Option<String>,
    /// RFC 3339 timestamp.
    pub estimated_completion: Option<String>,
}

/// Administrative listing row with owner context.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminComplaintRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub address: String,
}

impl From<(Complaint, User)> for AdminComplaintRow {
    fn from((complaint, owner): (Complaint, User)) -> Self {
        Self {
            id: complaint.id,
            title: complaint.title,
            description: complaint.description,
            category: complaint.category,
            priority: complaint.priority.to_string(),
            status: complaint.status.to_string(),
            assigned_to: complaint.assigned_to,
            response: complaint.response,
            created_at: complaint.created_at,
            user_name: owner.display_name(),
            address: owner.address(),
        }
    }
}

fn parse_update(payload: UpdateComplaintRequest) -> Result<ComplaintUpdate, crate::domain::Error> {
    Ok(ComplaintUpdate {
        status: payload
            .status
            .map(|raw| parse_status(&raw, "status"))
            .transpose()?,
        response: payload.response,
        resolution_notes: payload.resolution_notes,
        assigned_to: payload.assigned_to,
        estimated_completion: payload
            .estimated_completion
            .map(|raw| parse_rfc3339(&raw, "estimatedCompletion"))
            .transpose()?,
    })
}

/// The authenticated resident's complaints, most recent first.
#[utoipa::path(
    get,
    path = "/api/complaints",
    responses(
        (status = 200, description = "Complaints for the caller", body = [Complaint]),
        (status = 401, description = "Unauthorised"),
    ),
    tags = ["complaints"]
)]
#[get("/complaints")]
pub async fn list_complaints(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<Complaint>>> {
    let complaints = state.complaints.complaints_for(caller.0).await?;
    Ok(web::Json(complaints))
}

/// File a new complaint.
#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 200, description = "Created complaint", body = Complaint),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Unauthorised"),
    ),
    tags = ["complaints"]
)]
#[post("/complaints")]
pub async fn create_complaint(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateComplaintRequest>,
) -> ApiResult<web::Json<Complaint>> {
    let payload = payload.into_inner();
    let priority: Priority = payload
        .priority
        .map(|raw| parse_priority(&raw, "priority"))
        .transpose()?
        .unwrap_or_default();

    let complaint = state
        .complaints
        .create(CreateComplaint {
            user_id: caller.0,
            title: payload.title.unwrap_or_default(),
            description: payload.description.unwrap_or_default(),
            category: payload.category.unwrap_or_default(),
            priority,
        })
        .await?;
    Ok(web::Json(complaint))
}

/// Every complaint with owner context; administrative.
#[utoipa::path(
    get,
    path = "/api/admin/complaints",
    responses(
        (status = 200, description = "Complaints with owner context", body = [AdminComplaintRow]),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
    ),
    tags = ["admin"]
)]
#[get("/admin/complaints")]
pub async fn admin_complaints(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<AdminComplaintRow>>> {
    let rows = state.complaints.complaints_admin(caller.0).await?;
    Ok(web::Json(rows.into_iter().map(AdminComplaintRow::from).collect()))
}

/// Apply an administrative patch to one complaint.
#[utoipa::path(
    put,
    path = "/api/admin/complaints/{id}",
    request_body = UpdateComplaintRequest,
    params(("id" = Uuid, Path, description = "Complaint identifier")),
    responses(
        (status = 200, description = "Updated complaint", body = Complaint),
        (status = 400, description = "Invalid status or timestamp"),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Complaint not found"),
    ),
    tags = ["admin"]
)]
#[put("/admin/complaints/{id}")]
pub async fn update_complaint(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateComplaintRequest>,
) -> ApiResult<web::Json<Complaint>> {
    let patch = parse_update(payload.into_inner())?;
    let complaint = state
        .complaints
        .update(caller.0, path.into_inner(), patch)
        .await?;
    Ok(web::Json(complaint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::domain::complaint::ComplaintStatus;
    use crate::domain::fixtures::sample_complaint;
    use crate::domain::user::UserId;
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
                .service(list_complaints)
                .service(create_complaint)
                .service(admin_complaints)
                .service(update_complaint),
        )
        .await
    }

    #[actix_web::test]
    async fn creation_defaults_the_priority() {
        let (mut ports, user_id) = authed_ports();
        ports
            .complaints
            .expect_create()
            .withf(move |request: &CreateComplaint| {
                request.user_id == user_id && request.priority == Priority::Medium
            })
            .return_once(|request| {
                let mut complaint = sample_complaint(request.user_id);
                complaint.title = request.title;
                Ok(complaint)
            });

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/complaints")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({
                    "title": "Leaking pipe",
                    "description": "Kitchen riser drips",
                    "category": "plumbing",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "new");
    }

    #[actix_web::test]
    async fn validation_failures_surface_as_bad_request() {
        let (mut ports, _) = authed_ports();
        ports.complaints.expect_create().return_once(|_| {
            Err(Error::invalid_request("missing required field: description"))
        });

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/complaints")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({ "title": "x", "category": "plumbing" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_status_is_rejected_before_the_port() {
        let (mut ports, _) = authed_ports();
        ports.complaints.expect_update().times(0);

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/admin/complaints/{}", Uuid::new_v4()))
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({ "status": "reopened" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn updates_parse_every_present_field() {
        let (mut ports, _) = authed_ports();
        ports
            .complaints
            .expect_update()
            .withf(|_, _, patch: &ComplaintUpdate| {
                patch.status == Some(ComplaintStatus::InProgress)
                    && patch.assigned_to.as_deref() == Some("Pavel Orlov")
                    && patch.estimated_completion.is_some()
            })
            .return_once(|_, id, patch| {
                let mut complaint = sample_complaint(UserId::random());
                complaint.id = id;
                complaint.status = patch.status.unwrap_or(ComplaintStatus::New);
                Ok(complaint)
            });

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/admin/complaints/{}", Uuid::new_v4()))
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({
                    "status": "in_progress",
                    "assignedTo": "Pavel Orlov",
                    "estimatedCompletion": "2024-05-20T10:00:00Z",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "in_progress");
    }

    #[actix_web::test]
    async fn admin_rows_join_owner_context() {
        let (mut ports, _) = authed_ports();
        ports.complaints.expect_complaints_admin().return_once(|_| {
            let owner = crate::domain::fixtures::sample_user(UserId::random());
            Ok(vec![(sample_complaint(owner.id), owner)])
        });

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin/complaints")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body[0]["userName"], "Anna Serova");
        assert_eq!(body[0]["address"], "Sadovaya 3 15");
    }
}
