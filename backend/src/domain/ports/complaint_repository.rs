//! Port abstraction for complaint persistence adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::complaint::{Complaint, ComplaintStatus};
use crate::domain::user::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by complaint repository adapters.
    pub enum ComplaintPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "complaint repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "complaint repository query failed: {message}",
    }
}

/// Field-level changes computed by the tracker service.
///
/// `None` leaves the column untouched; the service decides which fields
/// change, including the one-shot `actual_completion` stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintChanges {
    pub status: Option<ComplaintStatus>,
    pub response: Option<String>,
    pub resolution_notes: Option<String>,
    pub assigned_to: Option<String>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub actual_completion: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Insert a freshly created complaint.
    async fn insert(&self, complaint: &Complaint) -> Result<(), ComplaintPersistenceError>;

    /// Fetch a complaint by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Complaint>, ComplaintPersistenceError>;

    /// A user's complaints, most recent first.
    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Complaint>, ComplaintPersistenceError>;

    /// Every complaint joined with its owner, most recent first.
    async fn list_with_owners(
        &self,
    ) -> Result<Vec<(Complaint, User)>, ComplaintPersistenceError>;

    /// Apply computed changes, returning the updated row when the complaint
    /// exists.
    async fn apply_changes(
        &self,
        id: Uuid,
        changes: &ComplaintChanges,
    ) -> Result<Option<Complaint>, ComplaintPersistenceError>;

    /// Total complaint count.
    async fn count_all(&self) -> Result<i64, ComplaintPersistenceError>;

    /// Complaint count in a given status.
    async fn count_with_status(
        &self,
        status: ComplaintStatus,
    ) -> Result<i64, ComplaintPersistenceError>;

    /// Complaint count for one user.
    async fn count_for_user(&self, user_id: UserId) -> Result<i64, ComplaintPersistenceError>;

    /// Complaint count for one user in a given status.
    async fn count_for_user_with_status(
        &self,
        user_id: UserId,
        status: ComplaintStatus,
    ) -> Result<i64, ComplaintPersistenceError>;

    /// Per-user complaint counts for the resident directory.
    async fn counts_by_user(&self) -> Result<Vec<(UserId, i64)>, ComplaintPersistenceError>;
}
