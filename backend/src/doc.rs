//! OpenAPI surface aggregated from the HTTP handlers.

use utoipa::OpenApi;

use crate::domain::complaint::{Complaint, ComplaintCategory, ComplaintStatus, Priority};
use crate::domain::error::ErrorCode;
use crate::domain::meter::{MeterKind, MeterReading, MeterType};
use crate::domain::notification::Severity;
use crate::domain::ports::{
    AdminStats, LastReading, MessagingStats, NotificationView, ReadingGroup, UserStats,
};
use crate::domain::user::{ProfilePatch, UserId};
use crate::inbound::http::complaints::{AdminComplaintRow, CreateComplaintRequest, UpdateComplaintRequest};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::meters::{AdminReadingRow, SubmitReadingRequest};
use crate::inbound::http::notifications::{BroadcastResponse, SendNotificationRequest};
use crate::inbound::http::reports::{BuildingView, ResidentView};
use crate::inbound::http::schemas::UserView;

/// Public OpenAPI document served by Swagger UI in debug builds.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::auth::telegram_auth,
        crate::inbound::http::profile::get_profile,
        crate::inbound::http::profile::update_profile,
        crate::inbound::http::catalog::meter_types,
        crate::inbound::http::catalog::complaint_categories,
        crate::inbound::http::meters::list_readings,
        crate::inbound::http::meters::submit_reading,
        crate::inbound::http::meters::admin_readings,
        crate::inbound::http::meters::verify_reading,
        crate::inbound::http::complaints::list_complaints,
        crate::inbound::http::complaints::create_complaint,
        crate::inbound::http::complaints::admin_complaints,
        crate::inbound::http::complaints::update_complaint,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_notification_read,
        crate::inbound::http::notifications::send_notification,
        crate::inbound::http::notifications::messaging_stats,
        crate::inbound::http::reports::user_stats,
        crate::inbound::http::reports::admin_stats,
        crate::inbound::http::reports::admin_users,
        crate::inbound::http::reports::admin_buildings,
        crate::inbound::http::reports::export,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        UserId,
        UserView,
        ProfilePatch,
        MeterKind,
        MeterReading,
        MeterType,
        ReadingGroup,
        SubmitReadingRequest,
        AdminReadingRow,
        Complaint,
        ComplaintCategory,
        ComplaintStatus,
        Priority,
        CreateComplaintRequest,
        UpdateComplaintRequest,
        AdminComplaintRow,
        Severity,
        SendNotificationRequest,
        BroadcastResponse,
        NotificationView,
        MessagingStats,
        UserStats,
        LastReading,
        AdminStats,
        BuildingView,
        ResidentView,
    )),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "users", description = "Profiles and resident dashboards"),
        (name = "meters", description = "Meter reading ledger"),
        (name = "complaints", description = "Complaint tracker"),
        (name = "notifications", description = "Notification feed"),
        (name = "catalog", description = "Reference catalogs"),
        (name = "admin", description = "Administrative operations"),
        (name = "health", description = "Probes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_the_core_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/meters/readings/{kind}"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/admin/notifications"));
        assert!(paths.iter().any(|p| p.as_str() == "/health/live"));
    }
}
