//! Driving port for read-side reporting projections.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::meter::MeterKind;
use crate::domain::user::{User, UserId};

use super::user_repository::BuildingRef;

/// Per-user dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub readings_count: i64,
    pub complaints_count: i64,
    pub open_complaints: i64,
    pub last_reading: Option<LastReading>,
}

/// The most recent reading across all of a user's meters.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastReading {
    pub kind: MeterKind,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// System-wide dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_complaints: i64,
    pub total_readings: i64,
    pub open_complaints: i64,
}

/// Directory row: a resident plus their activity counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentRow {
    pub user: User,
    pub readings_count: i64,
    pub complaints_count: i64,
}

/// Which export the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Complaints,
    Readings,
    Users,
}

/// Failure parsing an export kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExportKindError(pub String);

impl fmt::Display for UnknownExportKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown export kind: {}", self.0)
    }
}

impl std::error::Error for UnknownExportKindError {}

impl FromStr for ExportKind {
    type Err = UnknownExportKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complaints" => Ok(Self::Complaints),
            "meter_readings" => Ok(Self::Readings),
            "users" => Ok(Self::Users),
            other => Err(UnknownExportKindError(other.to_owned())),
        }
    }
}

/// Flat tabular export reflecting current persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularReport {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Domain use-case port for read-only aggregation.
///
/// Carries no invariants of its own; every query reflects the persisted
/// state at call time with no caching layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reporting: Send + Sync {
    /// Dashboard counters for one resident.
    async fn user_stats(&self, user_id: UserId) -> Result<UserStats, Error>;

    /// System-wide counters; administrative.
    async fn admin_stats(&self, admin_id: UserId) -> Result<AdminStats, Error>;

    /// Distinct buildings derived from resident addresses; administrative.
    async fn buildings(&self, admin_id: UserId) -> Result<Vec<BuildingRef>, Error>;

    /// Resident directory with activity counters; administrative.
    async fn residents(&self, admin_id: UserId) -> Result<Vec<ResidentRow>, Error>;

    /// Flat tabular export; administrative.
    async fn export(&self, admin_id: UserId, kind: ExportKind)
    -> Result<TabularReport, Error>;
}
