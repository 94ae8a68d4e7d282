//! Notification fan-out model.
//!
//! A broadcast materialises one [`Notification`] row per targeted resident
//! so in-app history stays consistent regardless of external delivery
//! outcome.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Severity tag rendered by clients and in the messaging channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

impl Severity {
    /// Stable wire/storage code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Emoji prefix used when rendering for the messaging channel.
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Info => "\u{2139}\u{fe0f}",
            Self::Warning => "\u{26a0}\u{fe0f}",
            Self::Success => "\u{2705}",
            Self::Error => "\u{274c}",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure parsing a severity code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverityError(pub String);

impl fmt::Display for UnknownSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity: {}", self.0)
    }
}

impl std::error::Error for UnknownSeverityError {}

impl FromStr for Severity {
    type Err = UnknownSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(UnknownSeverityError(other.to_owned())),
        }
    }
}

/// Audience selector for a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every active resident.
    All,
    /// Active residents of one building.
    Building(String),
    /// An explicit set of residents; inactive accounts are filtered out.
    Specific(Vec<UserId>),
}

/// One per-recipient notification row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient: UserId,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub sent_at: DateTime<Utc>,
    /// Residents who marked the row read; set semantics, never duplicated.
    pub read_by: Vec<UserId>,
}

impl Notification {
    /// Whether the given resident has marked this row read.
    pub fn is_read_by(&self, user_id: UserId) -> bool {
        self.read_by.contains(&user_id)
    }

    /// Add the resident to the read-by set.
    ///
    /// Returns `false` when already present; the set never grows from a
    /// repeated mark.
    pub fn mark_read_by(&mut self, user_id: UserId) -> bool {
        if self.is_read_by(user_id) {
            return false;
        }
        self.read_by.push(user_id);
        true
    }
}

/// Aggregate outcome of one broadcast.
///
/// Partial delivery is the expected common case, not an error; callers
/// phrase results as "sent of total".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReport {
    pub sent_count: usize,
    pub failed_count: usize,
    pub total_count: usize,
}

impl BroadcastReport {
    /// Caller-facing summary line.
    pub fn summary(&self) -> String {
        format!(
            "notification delivered to {} of {} residents",
            self.sent_count, self.total_count
        )
    }
}

/// Render the channel message body: severity emoji, bold title, body text
/// and a fixed footer, in the gateway's HTML dialect.
pub fn channel_text(title: &str, message: &str, severity: Severity) -> String {
    format!(
        "{} <b>{title}</b>\n\n{message}\n\n<i>Sent by the building management system</i>",
        severity.emoji()
    )
}
