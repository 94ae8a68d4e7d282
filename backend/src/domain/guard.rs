//! Shared authorisation guard for admin-gated use-cases.

use tracing::debug;

use super::Error;
use super::ports::{UserPersistenceError, UserRepository};
use super::user::{User, UserId};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    Error::internal(format!("user repository failure: {error}"))
}

/// Load the acting user and require the administrative flag.
///
/// A dangling identity is unauthorised (the credential no longer resolves);
/// a resolved non-admin identity is forbidden.
pub(crate) async fn load_admin<U>(users: &U, user_id: UserId) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    let user = users
        .find_by_id(user_id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| {
            debug!(%user_id, "credential references a missing account");
            Error::unauthorized("invalid credentials")
        })?;
    if !user.is_admin {
        return Err(Error::forbidden("admin access required"));
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::fixtures::{sample_admin, sample_user};
    use crate::domain::ports::MockUserRepository;

    #[tokio::test]
    async fn resolves_admin_accounts() {
        let admin_id = UserId::random();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |id| Ok(Some(sample_admin(id))));

        let admin = load_admin(&users, admin_id).await.expect("admin resolves");
        assert!(admin.is_admin);
    }

    #[tokio::test]
    async fn missing_accounts_are_unauthorised() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));

        let error = load_admin(&users, UserId::random())
            .await
            .expect_err("dangling identity");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn non_admin_accounts_are_forbidden() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |id| Ok(Some(sample_user(id))));

        let error = load_admin(&users, UserId::random())
            .await
            .expect_err("resident identity");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}
