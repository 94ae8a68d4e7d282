//! Complaint tracker service.
//!
//! Owns the complaint status state machine and administrative annotations.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use uuid::Uuid;

use super::Error;
use super::complaint::{Complaint, ComplaintStatus, ComplaintUpdate};
use super::guard::load_admin;
use super::ports::{
    ComplaintChanges, ComplaintDesk, ComplaintPersistenceError, ComplaintRepository,
    CreateComplaint, UserRepository,
};
use super::user::{User, UserId};

fn map_complaint_error(error: ComplaintPersistenceError) -> Error {
    Error::internal(format!("complaint repository failure: {error}"))
}

fn require_text(value: &str, field: &'static str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(
            Error::invalid_request(format!("missing required field: {field}"))
                .with_details(json!({ "field": field })),
        );
    }
    Ok(())
}

/// Complaint tracker service implementing the driving port.
#[derive(Clone)]
pub struct TrackerService<C, U> {
    complaints: Arc<C>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<C, U> TrackerService<C, U> {
    /// Create a new service.
    pub fn new(complaints: Arc<C>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            complaints,
            users,
            clock,
        }
    }
}

#[async_trait]
impl<C, U> ComplaintDesk for TrackerService<C, U>
where
    C: ComplaintRepository,
    U: UserRepository,
{
    async fn create(&self, request: CreateComplaint) -> Result<Complaint, Error> {
        require_text(&request.title, "title")?;
        require_text(&request.description, "description")?;
        require_text(&request.category, "category")?;

        let now = self.clock.utc();
        let complaint = Complaint {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            title: request.title,
            description: request.description,
            category: request.category,
            priority: request.priority,
            status: ComplaintStatus::New,
            assigned_to: None,
            response: None,
            resolution_notes: None,
            estimated_completion: None,
            actual_completion: None,
            created_at: now,
            updated_at: now,
        };
        self.complaints
            .insert(&complaint)
            .await
            .map_err(map_complaint_error)?;
        Ok(complaint)
    }

    async fn complaints_for(&self, user_id: UserId) -> Result<Vec<Complaint>, Error> {
        self.complaints
            .list_for_user(user_id)
            .await
            .map_err(map_complaint_error)
    }

    async fn update(
        &self,
        admin_id: UserId,
        complaint_id: Uuid,
        patch: ComplaintUpdate,
    ) -> Result<Complaint, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        let complaint = self
            .complaints
            .find_by_id(complaint_id)
            .await
            .map_err(map_complaint_error)?
            .ok_or_else(|| Error::not_found("complaint not found"))?;

        let now = self.clock.utc();
        // Only the first transition into Resolved stamps the completion
        // time; later resolves leave it untouched.
        let actual_completion = (patch.status == Some(ComplaintStatus::Resolved)
            && complaint.actual_completion.is_none())
        .then_some(now);

        let changes = ComplaintChanges {
            status: patch.status,
            response: patch.response,
            resolution_notes: patch.resolution_notes,
            assigned_to: patch.assigned_to,
            estimated_completion: patch.estimated_completion,
            actual_completion,
            updated_at: now,
        };
        self.complaints
            .apply_changes(complaint_id, &changes)
            .await
            .map_err(map_complaint_error)?
            .ok_or_else(|| Error::not_found("complaint not found"))
    }

    async fn complaints_admin(
        &self,
        admin_id: UserId,
    ) -> Result<Vec<(Complaint, User)>, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        self.complaints
            .list_with_owners()
            .await
            .map_err(map_complaint_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::complaint::Priority;
    use crate::domain::fixtures::{fixed_instant, sample_admin, sample_complaint, sample_user};
    use crate::domain::ports::{MockComplaintRepository, MockUserRepository};
    use mockable::MockClock;

    fn service(
        complaints: MockComplaintRepository,
        users: MockUserRepository,
    ) -> TrackerService<MockComplaintRepository, MockUserRepository> {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(fixed_instant);
        TrackerService::new(Arc::new(complaints), Arc::new(users), Arc::new(clock))
    }

    fn create_request(user_id: UserId) -> CreateComplaint {
        CreateComplaint {
            user_id,
            title: "Leaking pipe".to_owned(),
            description: "Kitchen riser drips on the floor".to_owned(),
            category: "plumbing".to_owned(),
            priority: Priority::Medium,
        }
    }

    #[tokio::test]
    async fn creation_starts_in_the_new_status() {
        let mut complaints = MockComplaintRepository::new();
        complaints
            .expect_insert()
            .withf(|complaint: &Complaint| {
                complaint.status == ComplaintStatus::New && complaint.actual_completion.is_none()
            })
            .return_once(|_| Ok(()));

        let complaint = service(complaints, MockUserRepository::new())
            .create(create_request(UserId::random()))
            .await
            .expect("creation succeeds");
        assert_eq!(complaint.status, ComplaintStatus::New);
    }

    #[tokio::test]
    async fn empty_description_is_rejected_without_persisting() {
        let mut complaints = MockComplaintRepository::new();
        complaints.expect_insert().times(0);

        let mut request = create_request(UserId::random());
        request.description = "  ".to_owned();
        let error = service(complaints, MockUserRepository::new())
            .create(request)
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_requires_the_admin_flag() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_user(id))));
        let mut complaints = MockComplaintRepository::new();
        complaints.expect_apply_changes().times(0);

        let error = service(complaints, users)
            .update(UserId::random(), Uuid::new_v4(), ComplaintUpdate::default())
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn missing_complaint_is_not_found() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_admin(id))));
        let mut complaints = MockComplaintRepository::new();
        complaints.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(complaints, users)
            .update(UserId::random(), Uuid::new_v4(), ComplaintUpdate::default())
            .await
            .expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn resolving_stamps_completion_once() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_admin(id))));
        let mut complaints = MockComplaintRepository::new();
        complaints
            .expect_find_by_id()
            .return_once(|id| {
                let mut complaint = sample_complaint(UserId::random());
                complaint.id = id;
                Ok(Some(complaint))
            });
        complaints
            .expect_apply_changes()
            .withf(|_, changes: &ComplaintChanges| {
                changes.status == Some(ComplaintStatus::Resolved)
                    && changes.actual_completion == Some(fixed_instant())
            })
            .return_once(|id, changes| {
                let mut complaint = sample_complaint(UserId::random());
                complaint.id = id;
                complaint.status = ComplaintStatus::Resolved;
                complaint.actual_completion = changes.actual_completion;
                Ok(Some(complaint))
            });

        let patch = ComplaintUpdate {
            status: Some(ComplaintStatus::Resolved),
            ..ComplaintUpdate::default()
        };
        let complaint = service(complaints, users)
            .update(UserId::random(), Uuid::new_v4(), patch)
            .await
            .expect("update succeeds");
        assert_eq!(complaint.actual_completion, Some(fixed_instant()));
    }

    #[tokio::test]
    async fn repeated_resolve_leaves_the_stamp_alone() {
        let earlier = fixed_instant() - chrono::Duration::days(2);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_admin(id))));
        let mut complaints = MockComplaintRepository::new();
        complaints.expect_find_by_id().return_once(move |id| {
            let mut complaint = sample_complaint(UserId::random());
            complaint.id = id;
            complaint.status = ComplaintStatus::Resolved;
            complaint.actual_completion = Some(earlier);
            Ok(Some(complaint))
        });
        complaints
            .expect_apply_changes()
            .withf(|_, changes: &ComplaintChanges| changes.actual_completion.is_none())
            .return_once(|id, _| {
                let mut complaint = sample_complaint(UserId::random());
                complaint.id = id;
                Ok(Some(complaint))
            });

        let patch = ComplaintUpdate {
            status: Some(ComplaintStatus::Resolved),
            ..ComplaintUpdate::default()
        };
        service(complaints, users)
            .update(UserId::random(), Uuid::new_v4(), patch)
            .await
            .expect("update succeeds");
    }

    #[tokio::test]
    async fn other_statuses_never_touch_completion() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_admin(id))));
        let mut complaints = MockComplaintRepository::new();
        complaints.expect_find_by_id().return_once(|id| {
            let mut complaint = sample_complaint(UserId::random());
            complaint.id = id;
            Ok(Some(complaint))
        });
        complaints
            .expect_apply_changes()
            .withf(|_, changes: &ComplaintChanges| {
                changes.status == Some(ComplaintStatus::Rejected)
                    && changes.actual_completion.is_none()
                    && changes.updated_at == fixed_instant()
            })
            .return_once(|id, _| {
                let mut complaint = sample_complaint(UserId::random());
                complaint.id = id;
                complaint.status = ComplaintStatus::Rejected;
                Ok(Some(complaint))
            });

        let patch = ComplaintUpdate {
            status: Some(ComplaintStatus::Rejected),
            ..ComplaintUpdate::default()
        };
        service(complaints, users)
            .update(UserId::random(), Uuid::new_v4(), patch)
            .await
            .expect("update succeeds");
    }

    #[tokio::test]
    async fn field_only_updates_refresh_the_timestamp() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_admin(id))));
        let mut complaints = MockComplaintRepository::new();
        complaints.expect_find_by_id().return_once(|id| {
            let mut complaint = sample_complaint(UserId::random());
            complaint.id = id;
            Ok(Some(complaint))
        });
        complaints
            .expect_apply_changes()
            .withf(|_, changes: &ComplaintChanges| {
                changes.status.is_none()
                    && changes.response.as_deref() == Some("plumber booked")
                    && changes.updated_at == fixed_instant()
            })
            .return_once(|id, changes| {
                let mut complaint = sample_complaint(UserId::random());
                complaint.id = id;
                complaint.response.clone_from(&changes.response);
                complaint.updated_at = changes.updated_at;
                Ok(Some(complaint))
            });

        let patch = ComplaintUpdate {
            response: Some("plumber booked".to_owned()),
            ..ComplaintUpdate::default()
        };
        let complaint = service(complaints, users)
            .update(UserId::random(), Uuid::new_v4(), patch)
            .await
            .expect("update succeeds");
        assert_eq!(complaint.updated_at, fixed_instant());
    }
}
