//! Notification broadcaster service.
//!
//! Resolves a target audience, pushes one message per recipient through the
//! external gateway, and persists one notification row per recipient. The
//! in-app row and the external push are decoupled: a failed push never
//! rolls back the stored row, and one recipient's failure never blocks
//! another's attempt.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use futures_util::StreamExt;
use futures_util::stream;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::Error;
use super::guard::{load_admin, map_user_error};
use super::notification::{BroadcastReport, Notification, Target, channel_text};
use super::ports::{
    BroadcastRequest, Broadcaster, Messenger, MessagingStats, NotificationPersistenceError,
    NotificationRepository, NotificationView, UserRepository,
};
use super::user::{User, UserId};

/// Bounded fan-out width: recipients dispatch concurrently without
/// flooding the gateway.
const FANOUT_CONCURRENCY: usize = 8;

/// Feed page size matching the source system.
const FEED_LIMIT: i64 = 50;

fn map_notification_error(error: NotificationPersistenceError) -> Error {
    Error::internal(format!("notification repository failure: {error}"))
}

/// Broadcaster service implementing the driving port.
#[derive(Clone)]
pub struct BroadcastService<U, N, M> {
    users: Arc<U>,
    notifications: Arc<N>,
    messenger: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<U, N, M> BroadcastService<U, N, M> {
    /// Create a new service.
    pub fn new(
        users: Arc<U>,
        notifications: Arc<N>,
        messenger: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            notifications,
            messenger,
            clock,
        }
    }
}

impl<U, N, M> BroadcastService<U, N, M>
where
    U: UserRepository,
    N: NotificationRepository,
    M: Messenger,
{
    async fn resolve_audience(&self, target: &Target) -> Result<Vec<User>, Error> {
        let audience = match target {
            Target::All => self.users.list_active().await,
            Target::Building(building) => self.users.list_active_in_building(building).await,
            Target::Specific(ids) => self.users.list_active_by_ids(ids).await,
        };
        audience.map_err(map_user_error)
    }
}

#[async_trait]
impl<U, N, M> Broadcaster for BroadcastService<U, N, M>
where
    U: UserRepository,
    N: NotificationRepository,
    M: Messenger,
{
    async fn broadcast(
        &self,
        admin_id: UserId,
        request: BroadcastRequest,
    ) -> Result<BroadcastReport, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        if request.title.trim().is_empty() || request.message.trim().is_empty() {
            return Err(Error::invalid_request("title and message are required")
                .with_details(json!({ "fields": ["title", "message"] })));
        }

        let recipients = self.resolve_audience(&request.target).await?;
        let text = channel_text(&request.title, &request.message, request.severity);
        let sent_at = self.clock.utc();

        let outcomes: Vec<bool> = stream::iter(recipients.into_iter().map(|recipient| {
            let messenger = Arc::clone(&self.messenger);
            let notifications = Arc::clone(&self.notifications);
            let text = text.clone();
            let title = request.title.clone();
            let message = request.message.clone();
            let severity = request.severity;
            async move {
                let delivered = match messenger.deliver(&recipient.external_id, &text).await {
                    Ok(()) => true,
                    Err(delivery_error) => {
                        warn!(
                            recipient = %recipient.id,
                            error = %delivery_error,
                            "external delivery failed"
                        );
                        false
                    }
                };
                // The in-app row persists regardless of delivery outcome.
                let row = Notification {
                    id: Uuid::new_v4(),
                    recipient: recipient.id,
                    title,
                    message,
                    severity,
                    sent_at,
                    read_by: Vec::new(),
                };
                if let Err(persistence_error) = notifications.insert(&row).await {
                    error!(
                        recipient = %recipient.id,
                        error = %persistence_error,
                        "failed to persist notification row"
                    );
                }
                delivered
            }
        }))
        .buffer_unordered(FANOUT_CONCURRENCY)
        .collect()
        .await;

        let total_count = outcomes.len();
        let sent_count = outcomes.into_iter().filter(|delivered| *delivered).count();
        let report = BroadcastReport {
            sent_count,
            failed_count: total_count - sent_count,
            total_count,
        };
        info!(
            sent = report.sent_count,
            failed = report.failed_count,
            total = report.total_count,
            "broadcast completed"
        );
        Ok(report)
    }

    async fn notifications_for(
        &self,
        user_id: UserId,
    ) -> Result<Vec<NotificationView>, Error> {
        let rows = self
            .notifications
            .list_for_recipient(user_id, FEED_LIMIT)
            .await
            .map_err(map_notification_error)?;
        Ok(rows
            .into_iter()
            .map(|row| NotificationView {
                id: row.id,
                read: row.is_read_by(user_id),
                title: row.title,
                message: row.message,
                severity: row.severity,
                sent_at: row.sent_at,
            })
            .collect())
    }

    async fn mark_read(&self, user_id: UserId, notification_id: Uuid) -> Result<(), Error> {
        let existed = self
            .notifications
            .mark_read(notification_id, user_id)
            .await
            .map_err(map_notification_error)?;
        if !existed {
            return Err(Error::not_found("notification not found"));
        }
        Ok(())
    }

    async fn messaging_stats(&self, admin_id: UserId) -> Result<MessagingStats, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        let active_users = self.users.count_active().await.map_err(map_user_error)?;
        let total_notifications = self
            .notifications
            .count_all()
            .await
            .map_err(map_notification_error)?;
        let recent_notifications = self
            .notifications
            .count_since(self.clock.utc() - Duration::days(7))
            .await
            .map_err(map_notification_error)?;
        Ok(MessagingStats {
            active_users,
            total_notifications,
            recent_notifications,
        })
    }
}
