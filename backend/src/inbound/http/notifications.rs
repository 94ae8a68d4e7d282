//! Notification endpoints.
//!
//! ```text
//! POST /api/admin/notifications
//! GET  /api/notifications
//! PUT  /api/notifications/{id}/read
//! GET  /api/admin/messaging/stats
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::notification::{Severity, Target};
use crate::domain::ports::{BroadcastRequest, MessagingStats, NotificationView};
use crate::domain::user::UserId;

use super::bearer::Authenticated;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{missing_field_error, parse_severity, parse_uuid_list};

/// Broadcast payload composed in the admin panel.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    /// `all`, `building` or `specific`.
    pub target: Option<String>,
    pub building_id: Option<String>,
    pub user_ids: Option<Vec<String>>,
    pub severity: Option<String>,
}

/// Broadcast outcome with the caller-facing summary line.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResponse {
    pub sent_count: usize,
    pub failed_count: usize,
    pub total_count: usize,
    pub message: String,
}

fn parse_target(payload: &SendNotificationRequest) -> Result<Target, crate::domain::Error> {
    match payload.target.as_deref().unwrap_or("all") {
        "all" => Ok(Target::All),
        "building" => {
            let building = payload
                .building_id
                .as_deref()
                .map(str::trim)
                .filter(|building| !building.is_empty())
                .ok_or_else(|| missing_field_error("buildingId"))?;
            Ok(Target::Building(building.to_owned()))
        }
        "specific" => {
            let raw_ids = payload
                .user_ids
                .as_deref()
                .filter(|ids| !ids.is_empty())
                .ok_or_else(|| missing_field_error("userIds"))?;
            let ids = parse_uuid_list(raw_ids, "userIds")?;
            Ok(Target::Specific(
                ids.into_iter().map(UserId::from_uuid).collect(),
            ))
        }
        other => Err(crate::domain::Error::invalid_request(format!(
            "target must be one of all, building, specific (got {other})"
        ))),
    }
}

/// Fan a notification out to the selected audience; administrative.
#[utoipa::path(
    post,
    path = "/api/admin/notifications",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Delivery counts", body = BroadcastResponse),
        (status = 400, description = "Malformed audience target"),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
    ),
    tags = ["admin"]
)]
#[post("/admin/notifications")]
pub async fn send_notification(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<SendNotificationRequest>,
) -> ApiResult<web::Json<BroadcastResponse>> {
    let payload = payload.into_inner();
    let target = parse_target(&payload)?;
    let severity = payload
        .severity
        .map(|raw| parse_severity(&raw, "severity"))
        .transpose()?
        .unwrap_or(Severity::Info);

    let report = state
        .broadcaster
        .broadcast(
            caller.0,
            BroadcastRequest {
                title: payload.title.unwrap_or_default(),
                message: payload.message.unwrap_or_default(),
                target,
                severity,
            },
        )
        .await?;
    Ok(web::Json(BroadcastResponse {
        sent_count: report.sent_count,
        failed_count: report.failed_count,
        total_count: report.total_count,
        message: report.summary(),
    }))
}

/// The authenticated resident's notification feed.
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Notification feed", body = [NotificationView]),
        (status = 401, description = "Unauthorised"),
    ),
    tags = ["notifications"]
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<NotificationView>>> {
    let feed = state.broadcaster.notifications_for(caller.0).await?;
    Ok(web::Json(feed))
}

/// Mark one notification read for the caller; idempotent.
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification identifier")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 401, description = "Unauthorised"),
        (status = 404, description = "Notification not found"),
    ),
    tags = ["notifications"]
)]
#[put("/notifications/{id}/read")]
pub async fn mark_notification_read(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .broadcaster
        .mark_read(caller.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Messaging coverage counters; administrative.
#[utoipa::path(
    get,
    path = "/api/admin/messaging/stats",
    responses(
        (status = 200, description = "Messaging counters", body = MessagingStats),
        (status = 401, description = "Unauthorised"),
        (status = 403, description = "Admin access required"),
    ),
    tags = ["admin"]
)]
#[get("/admin/messaging/stats")]
pub async fn messaging_stats(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<MessagingStats>> {
    let stats = state.broadcaster.messaging_stats(caller.0).await?;
    Ok(web::Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::domain::notification::BroadcastReport;
    use crate::inbound::http::state::test_support::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::http::header;
    use actix_web::{App, test};
    use chrono::Utc;

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
                .service(send_notification)
                .service(list_notifications)
                .service(mark_notification_read)
                .service(messaging_stats),
        )
        .await
    }

    #[actix_web::test]
    async fn broadcast_reports_partial_delivery() {
        let (mut ports, _) = authed_ports();
        ports
            .broadcaster
            .expect_broadcast()
            .withf(|_, request: &BroadcastRequest| {
                matches!(&request.target, Target::Specific(ids) if ids.len() == 2)
                    && request.severity == Severity::Info
            })
            .return_once(|_, _| {
                Ok(BroadcastReport {
                    sent_count: 1,
                    failed_count: 1,
                    total_count: 2,
                })
            });

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/admin/notifications")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({
                    "title": "Water outage",
                    "message": "Repairs until 18:00",
                    "target": "specific",
                    "userIds": [Uuid::new_v4().to_string(), Uuid::new_v4().to_string()],
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["sentCount"], 1);
        assert_eq!(body["failedCount"], 1);
        assert_eq!(body["totalCount"], 2);
        assert_eq!(body["message"], "notification delivered to 1 of 2 residents");
    }

    #[actix_web::test]
    async fn building_target_requires_an_id() {
        let (mut ports, _) = authed_ports();
        ports.broadcaster.expect_broadcast().times(0);

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/admin/notifications")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({
                    "title": "t",
                    "message": "m",
                    "target": "building",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_target_is_rejected() {
        let (ports, _) = authed_ports();
        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/admin/notifications")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({
                    "title": "t",
                    "message": "m",
                    "target": "inactive",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn feed_serialises_views() {
        let (mut ports, _) = authed_ports();
        ports.broadcaster.expect_notifications_for().return_once(|_| {
            Ok(vec![NotificationView {
                id: Uuid::new_v4(),
                title: "Water outage".to_owned(),
                message: "Repairs until 18:00".to_owned(),
                severity: Severity::Warning,
                sent_at: Utc::now(),
                read: false,
            }])
        });

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/notifications")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body[0]["severity"], "warning");
        assert_eq!(body[0]["read"], false);
    }

    #[actix_web::test]
    async fn mark_read_returns_no_content() {
        let (mut ports, user_id) = authed_ports();
        let notification_id = Uuid::new_v4();
        ports
            .broadcaster
            .expect_mark_read()
            .withf(move |user, id| *user == user_id && *id == notification_id)
            .return_once(|_, _| Ok(()));

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/notifications/{notification_id}/read"))
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn marking_missing_rows_is_not_found() {
        let (mut ports, _) = authed_ports();
        ports
            .broadcaster
            .expect_mark_read()
            .return_once(|_, _| Err(Error::not_found("notification not found")));

        let app = spawn(ports).await;
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/notifications/{}/read", Uuid::new_v4()))
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
