//! Driving port for notification fan-out use-cases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::notification::{BroadcastReport, Severity, Target};
use crate::domain::user::UserId;

/// Broadcast payload composed by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRequest {
    pub title: String,
    pub message: String,
    pub target: Target,
    pub severity: Severity,
}

/// One notification row as seen by its recipient.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
}

/// Messaging coverage counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagingStats {
    pub active_users: i64,
    pub total_notifications: i64,
    /// Rows sent within the trailing seven days.
    pub recent_notifications: i64,
}

/// Domain use-case port for broadcasts and read tracking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Resolve the audience, push one message per recipient through the
    /// external gateway, and persist one row per recipient regardless of
    /// delivery outcome. Partial delivery is a success carrying counts.
    async fn broadcast(
        &self,
        admin_id: UserId,
        request: BroadcastRequest,
    ) -> Result<BroadcastReport, Error>;

    /// The recipient's notification feed, most recent first, capped.
    async fn notifications_for(&self, user_id: UserId)
    -> Result<Vec<NotificationView>, Error>;

    /// Idempotently add the user to a row's read-by set.
    async fn mark_read(&self, user_id: UserId, notification_id: Uuid) -> Result<(), Error>;

    /// Messaging coverage counters; administrative.
    async fn messaging_stats(&self, admin_id: UserId) -> Result<MessagingStats, Error>;
}
