//! Application wiring: route registration and port assembly.

pub mod config;

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::broadcast_service::BroadcastService;
use crate::domain::identity_service::IdentityService;
use crate::domain::ledger_service::LedgerService;
use crate::domain::report_service::ReportService;
use crate::domain::token::TokenCodec;
use crate::domain::tracker_service::TrackerService;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::{
    auth, catalog, complaints, meters, notifications, profile, reports, state::HttpState,
};
use crate::outbound::persistence::{
    DbPool, DieselCatalogRepository, DieselComplaintRepository, DieselNotificationRepository,
    DieselReadingRepository, DieselUserRepository,
};
use crate::outbound::photos::DirPhotoStore;
use crate::outbound::telegram::TelegramMessenger;

/// Assemble the production port implementations behind the HTTP state.
pub fn build_state(
    pool: DbPool,
    tokens: Arc<TokenCodec>,
    messenger: TelegramMessenger,
    photos: DirPhotoStore,
) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let readings = Arc::new(DieselReadingRepository::new(pool.clone()));
    let complaints = Arc::new(DieselComplaintRepository::new(pool.clone()));
    let notifications = Arc::new(DieselNotificationRepository::new(pool.clone()));
    let catalog = Arc::new(DieselCatalogRepository::new(pool));

    HttpState::new(
        Arc::new(IdentityService::new(
            Arc::clone(&users),
            tokens,
            Arc::clone(&clock),
        )),
        Arc::new(LedgerService::new(
            Arc::clone(&readings),
            Arc::clone(&users),
            Arc::new(photos),
            Arc::clone(&clock),
        )),
        Arc::new(TrackerService::new(
            Arc::clone(&complaints),
            Arc::clone(&users),
            Arc::clone(&clock),
        )),
        Arc::new(BroadcastService::new(
            Arc::clone(&users),
            notifications,
            Arc::new(messenger),
            clock,
        )),
        Arc::new(ReportService::new(users, readings, complaints)),
        catalog,
    )
}

/// Register the `/api` scope (and, in debug builds, the Swagger UI).
///
/// Expects an [`HttpState`] registered as app data on the enclosing `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(auth::telegram_auth)
            .service(profile::get_profile)
            .service(profile::update_profile)
            .service(catalog::meter_types)
            .service(catalog::complaint_categories)
            .service(meters::list_readings)
            .service(meters::submit_reading)
            .service(meters::admin_readings)
            .service(meters::verify_reading)
            .service(complaints::list_complaints)
            .service(complaints::create_complaint)
            .service(complaints::admin_complaints)
            .service(complaints::update_complaint)
            .service(notifications::list_notifications)
            .service(notifications::mark_notification_read)
            .service(notifications::send_notification)
            .service(notifications::messaging_stats)
            .service(reports::user_stats)
            .service(reports::admin_stats)
            .service(reports::admin_users)
            .service(reports::admin_buildings)
            .service(reports::export),
    );

    #[cfg(debug_assertions)]
    cfg.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::state::test_support::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn configure_mounts_the_api_scope() {
        let mut ports = MockPorts::default();
        ports
            .catalog
            .expect_list_meter_types()
            .return_once(|| Ok(crate::domain::meter::default_meter_types()));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .configure(configure),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/meter-types").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_routes_fall_through() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(MockPorts::default().into_state()))
                .configure(configure),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/unknown").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
