//! Port abstraction for user persistence adapters.

use async_trait::async_trait;

use crate::domain::user::{ExternalId, ProfilePatch, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Insert violated the external-identity uniqueness constraint.
        DuplicateExternalId { message: String } => "external identity already registered: {message}",
    }
}

/// Distinct building reference derived from resident addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingRef {
    pub building: String,
    pub street: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a freshly created user record.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by external identity.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Apply a profile patch, returning the updated row when it exists.
    async fn update_profile(
        &self,
        id: UserId,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Every active resident.
    async fn list_active(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Active residents of one building.
    async fn list_active_in_building(
        &self,
        building: &str,
    ) -> Result<Vec<User>, UserPersistenceError>;

    /// Active residents among an explicit id set.
    async fn list_active_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Every user regardless of activity, for administrative listings.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Distinct building/street pairs present in resident addresses.
    async fn distinct_buildings(&self) -> Result<Vec<BuildingRef>, UserPersistenceError>;

    /// Total user count.
    async fn count_all(&self) -> Result<i64, UserPersistenceError>;

    /// Active user count.
    async fn count_active(&self) -> Result<i64, UserPersistenceError>;
}
