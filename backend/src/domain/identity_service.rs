//! Identity resolution service.
//!
//! Wraps the token codec with the "account still exists" check and the
//! get-or-create-by-external-identity login flow.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::guard::map_user_error;
use super::ports::{ExternalLogin, Identity, LoginOutcome, UserPersistenceError, UserRepository};
use super::token::TokenCodec;
use super::user::{ProfilePatch, User, UserId};
use super::Error;

/// Identity service implementing the driving port.
#[derive(Clone)]
pub struct IdentityService<U> {
    users: Arc<U>,
    tokens: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl<U> IdentityService<U> {
    /// Create a new service.
    pub fn new(users: Arc<U>, tokens: Arc<TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            tokens,
            clock,
        }
    }
}

impl<U> IdentityService<U>
where
    U: UserRepository,
{
    fn issue_token(&self, user_id: UserId) -> Result<String, Error> {
        self.tokens
            .issue(user_id, self.clock.utc())
            .map_err(|error| Error::internal(format!("failed to issue credential: {error}")))
    }

    fn new_user(&self, login: ExternalLogin) -> User {
        User {
            id: UserId::random(),
            external_id: login.external_id,
            first_name: login.first_name,
            last_name: login.last_name,
            username: login.username,
            apartment: None,
            building: None,
            street: None,
            phone: None,
            email: None,
            is_admin: false,
            is_active: true,
            created_at: self.clock.utc(),
        }
    }
}

#[async_trait]
impl<U> Identity for IdentityService<U>
where
    U: UserRepository,
{
    async fn login(&self, login: ExternalLogin) -> Result<LoginOutcome, Error> {
        let external_id = login.external_id.clone();
        if let Some(user) = self
            .users
            .find_by_external_id(&external_id)
            .await
            .map_err(map_user_error)?
        {
            let token = self.issue_token(user.id)?;
            return Ok(LoginOutcome { token, user });
        }

        let user = self.new_user(login);
        match self.users.insert(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "registered resident on first login");
                let token = self.issue_token(user.id)?;
                Ok(LoginOutcome { token, user })
            }
            // Two first logins can race on the uniqueness constraint; the
            // loser adopts the row the winner created.
            Err(UserPersistenceError::DuplicateExternalId { .. }) => {
                let user = self
                    .users
                    .find_by_external_id(&external_id)
                    .await
                    .map_err(map_user_error)?
                    .ok_or_else(|| {
                        Error::internal("user row disappeared during login race resolution")
                    })?;
                let token = self.issue_token(user.id)?;
                Ok(LoginOutcome { token, user })
            }
            Err(error) => Err(map_user_error(error)),
        }
    }

    async fn authenticate(&self, credential: &str) -> Result<UserId, Error> {
        let user_id = self.tokens.verify(credential).map_err(|error| {
            debug!(%error, "credential verification failed");
            Error::unauthorized("invalid credentials")
        })?;
        match self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
        {
            Some(_) => Ok(user_id),
            None => {
                debug!(%user_id, "credential references a missing account");
                Err(Error::unauthorized("invalid credentials"))
            }
        }
    }

    async fn profile(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn update_profile(&self, user_id: UserId, patch: ProfilePatch) -> Result<User, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request("no profile fields provided"));
        }
        self.users
            .update_profile(user_id, &patch)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
