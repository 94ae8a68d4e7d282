//! Driving port for identity resolution and profile use-cases.
//!
//! Inbound adapters call this port to turn bearer credentials into user
//! identities without knowing the backing token or persistence machinery,
//! so handler tests can substitute a test double.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::user::{ExternalId, ProfilePatch, User, UserId};

/// Profile payload delivered by the external login callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLogin {
    pub external_id: ExternalId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// Successful login: a fresh bearer credential plus the resolved user.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Domain use-case port for authentication and profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Identity: Send + Sync {
    /// Get-or-create the user behind an external identity and issue a
    /// bearer credential. At most one user row exists per external id.
    async fn login(&self, login: ExternalLogin) -> Result<LoginOutcome, Error>;

    /// Resolve a bearer credential to a user id.
    ///
    /// Malformed, expired, badly signed and dangling credentials all
    /// collapse to a uniform unauthorised outcome.
    async fn authenticate(&self, credential: &str) -> Result<UserId, Error>;

    /// Fetch the full profile of an authenticated user.
    async fn profile(&self, user_id: UserId) -> Result<User, Error>;

    /// Apply a profile patch and return the updated user.
    async fn update_profile(&self, user_id: UserId, patch: ProfilePatch) -> Result<User, Error>;
}
