//! Resident profile endpoints.
//!
//! ```text
//! GET /api/users/profile
//! PUT /api/users/profile
//! ```

use actix_web::{get, put, web};

use crate::domain::user::ProfilePatch;

use super::bearer::Authenticated;
use super::error::ApiResult;
use super::schemas::UserView;
use super::state::HttpState;

/// Fetch the authenticated resident's profile.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Resident profile", body = UserView),
        (status = 401, description = "Unauthorised"),
    ),
    tags = ["users"]
)]
#[get("/users/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<UserView>> {
    let user = state.identity.profile(caller.0).await?;
    Ok(web::Json(UserView::from(user)))
}

/// Update the authenticated resident's profile fields.
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Updated profile", body = UserView),
        (status = 400, description = "Empty patch"),
        (status = 401, description = "Unauthorised"),
    ),
    tags = ["users"]
)]
#[put("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<ProfilePatch>,
) -> ApiResult<web::Json<UserView>> {
    let user = state
        .identity
        .update_profile(caller.0, payload.into_inner())
        .await?;
    Ok(web::Json(UserView::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::sample_user;
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

    #[actix_web::test]
    async fn profile_round_trips_through_the_port() {
        let (mut ports, user_id) = authed_ports();
        ports
            .identity
            .expect_profile()
            .withf(move |id| *id == user_id)
            .return_once(|id| Ok(sample_user(id)));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .service(get_profile),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/users/profile")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["firstName"], "Anna");
    }

    #[actix_web::test]
    async fn patch_payload_reaches_the_port() {
        let (mut ports, _user_id) = authed_ports();
        ports
            .identity
            .expect_update_profile()
            .withf(|_, patch| patch.phone.as_deref() == Some("+7 900 000-00-00"))
            .return_once(|id, patch| {
                let mut user = sample_user(id);
                user.phone = patch.phone;
                Ok(user)
            });

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .service(update_profile),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/users/profile")
                .insert_header((header::AUTHORIZATION, "Bearer token"))
                .set_json(serde_json::json!({ "phone": "+7 900 000-00-00" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["phone"], "+7 900 000-00-00");
    }
}
