//! Driving port for complaint tracker use-cases.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::complaint::{Complaint, ComplaintUpdate, Priority};
use crate::domain::user::{User, UserId};

/// Creation payload for one complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateComplaint {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
}

/// Domain use-case port for the complaint state machine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintDesk: Send + Sync {
    /// File a new complaint in the `new` status.
    async fn create(&self, request: CreateComplaint) -> Result<Complaint, Error>;

    /// A user's complaints, most recent first.
    async fn complaints_for(&self, user_id: UserId) -> Result<Vec<Complaint>, Error>;

    /// Apply an administrative patch; transitioning into `resolved` stamps
    /// the actual completion time exactly once.
    async fn update(
        &self,
        admin_id: UserId,
        complaint_id: Uuid,
        patch: ComplaintUpdate,
    ) -> Result<Complaint, Error>;

    /// Every complaint joined with its owner, most recent first.
    async fn complaints_admin(&self, admin_id: UserId)
    -> Result<Vec<(Complaint, User)>, Error>;
}
