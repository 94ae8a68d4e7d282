//! Read-side reporting projections.
//!
//! Joins readings, complaints and users into flat rows and dashboard
//! counters. No caching: every call reflects the persisted state at call
//! time.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::Error;
use super::complaint::ComplaintStatus;
use super::guard::{load_admin, map_user_error};
use super::meter::MeterReading;
use super::ports::{
    AdminStats, BuildingRef, ComplaintPersistenceError, ComplaintRepository, ExportKind,
    LastReading, ReadingFilter, ReadingPersistenceError, ReadingRepository, Reporting,
    ResidentRow, TabularReport, UserRepository, UserStats,
};
use super::user::{User, UserId};

fn map_reading_error(error: ReadingPersistenceError) -> Error {
    Error::internal(format!("reading repository failure: {error}"))
}

fn map_complaint_error(error: ComplaintPersistenceError) -> Error {
    Error::internal(format!("complaint repository failure: {error}"))
}

fn format_instant(instant: chrono::DateTime<chrono::Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_optional_number(value: Option<f64>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}

/// Reporting service implementing the driving port.
#[derive(Clone)]
pub struct ReportService<U, R, C> {
    users: Arc<U>,
    readings: Arc<R>,
    complaints: Arc<C>,
}

impl<U, R, C> ReportService<U, R, C> {
    /// Create a new service.
    pub fn new(users: Arc<U>, readings: Arc<R>, complaints: Arc<C>) -> Self {
        Self {
            users,
            readings,
            complaints,
        }
    }
}

impl<U, R, C> ReportService<U, R, C>
where
    U: UserRepository,
    R: ReadingRepository,
    C: ComplaintRepository,
{
    async fn complaints_report(&self) -> Result<TabularReport, Error> {
        let rows = self
            .complaints
            .list_with_owners()
            .await
            .map_err(map_complaint_error)?;
        Ok(TabularReport {
            title: "complaints".to_owned(),
            headers: vec![
                "id", "resident", "address", "title", "description", "category", "priority",
                "status", "response", "created_at", "updated_at",
            ],
            rows: rows
                .into_iter()
                .map(|(complaint, owner)| {
                    vec![
                        complaint.id.to_string(),
                        owner.display_name(),
                        owner.address(),
                        complaint.title,
                        complaint.description,
                        complaint.category,
                        complaint.priority.to_string(),
                        complaint.status.to_string(),
                        complaint.response.unwrap_or_default(),
                        format_instant(complaint.created_at),
                        format_instant(complaint.updated_at),
                    ]
                })
                .collect(),
        })
    }

    async fn readings_report(&self) -> Result<TabularReport, Error> {
        let rows = self
            .readings
            .list_filtered(&ReadingFilter::default())
            .await
            .map_err(map_reading_error)?;
        Ok(TabularReport {
            title: "meter_readings".to_owned(),
            headers: vec![
                "id", "resident", "address", "meter", "value", "previous_value", "consumption",
                "verification", "notes", "created_at",
            ],
            rows: rows
                .into_iter()
                .map(|(reading, owner)| {
                    let MeterReading {
                        id,
                        kind,
                        value,
                        previous_value,
                        consumption,
                        notes,
                        is_verified,
                        created_at,
                        ..
                    } = reading;
                    vec![
                        id.to_string(),
                        owner.display_name(),
                        owner.address(),
                        kind.to_string(),
                        value.to_string(),
                        format_optional_number(previous_value),
                        format_optional_number(consumption),
                        if is_verified { "verified" } else { "pending" }.to_owned(),
                        notes.unwrap_or_default(),
                        format_instant(created_at),
                    ]
                })
                .collect(),
        })
    }

    async fn users_report(&self) -> Result<TabularReport, Error> {
        let users = self.users.list_all().await.map_err(map_user_error)?;
        Ok(TabularReport {
            title: "users".to_owned(),
            headers: vec![
                "id", "first_name", "last_name", "username", "external_id", "address", "phone",
                "email", "active", "admin", "registered_at",
            ],
            rows: users
                .into_iter()
                .map(|user| {
                    vec![
                        user.id.to_string(),
                        user.first_name.clone(),
                        user.last_name.clone().unwrap_or_default(),
                        user.username.clone().unwrap_or_default(),
                        user.external_id.to_string(),
                        user.address(),
                        user.phone.clone().unwrap_or_default(),
                        user.email.clone().unwrap_or_default(),
                        if user.is_active { "yes" } else { "no" }.to_owned(),
                        if user.is_admin { "yes" } else { "no" }.to_owned(),
                        format_instant(user.created_at),
                    ]
                })
                .collect(),
        })
    }
}

#[async_trait]
impl<U, R, C> Reporting for ReportService<U, R, C>
where
    U: UserRepository,
    R: ReadingRepository,
    C: ComplaintRepository,
{
    async fn user_stats(&self, user_id: UserId) -> Result<UserStats, Error> {
        let readings_count = self
            .readings
            .count_for_user(user_id)
            .await
            .map_err(map_reading_error)?;
        let complaints_count = self
            .complaints
            .count_for_user(user_id)
            .await
            .map_err(map_complaint_error)?;
        let open_complaints = self
            .complaints
            .count_for_user_with_status(user_id, ComplaintStatus::New)
            .await
            .map_err(map_complaint_error)?;
        let last_reading = self
            .readings
            .latest_for_user(user_id)
            .await
            .map_err(map_reading_error)?
            .map(|reading| LastReading {
                kind: reading.kind,
                value: reading.value,
                recorded_at: reading.created_at,
            });
        Ok(UserStats {
            readings_count,
            complaints_count,
            open_complaints,
            last_reading,
        })
    }

    async fn admin_stats(&self, admin_id: UserId) -> Result<AdminStats, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        Ok(AdminStats {
            total_users: self.users.count_all().await.map_err(map_user_error)?,
            total_complaints: self
                .complaints
                .count_all()
                .await
                .map_err(map_complaint_error)?,
            total_readings: self.readings.count_all().await.map_err(map_reading_error)?,
            open_complaints: self
                .complaints
                .count_with_status(ComplaintStatus::New)
                .await
                .map_err(map_complaint_error)?,
        })
    }

    async fn buildings(&self, admin_id: UserId) -> Result<Vec<BuildingRef>, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        self.users
            .distinct_buildings()
            .await
            .map_err(map_user_error)
    }

    async fn residents(&self, admin_id: UserId) -> Result<Vec<ResidentRow>, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        let users: Vec<User> = self.users.list_all().await.map_err(map_user_error)?;
        let reading_counts: HashMap<UserId, i64> = self
            .readings
            .counts_by_user()
            .await
            .map_err(map_reading_error)?
            .into_iter()
            .collect();
        let complaint_counts: HashMap<UserId, i64> = self
            .complaints
            .counts_by_user()
            .await
            .map_err(map_complaint_error)?
            .into_iter()
            .collect();
        Ok(users
            .into_iter()
            .map(|user| {
                let readings_count = reading_counts.get(&user.id).copied().unwrap_or(0);
                let complaints_count = complaint_counts.get(&user.id).copied().unwrap_or(0);
                ResidentRow {
                    user,
                    readings_count,
                    complaints_count,
                }
            })
            .collect())
    }

    async fn export(
        &self,
        admin_id: UserId,
        kind: ExportKind,
    ) -> Result<TabularReport, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        match kind {
            ExportKind::Complaints => self.complaints_report().await,
            ExportKind::Readings => self.readings_report().await,
            ExportKind::Users => self.users_report().await,
        }
    }
}
