//! Shared classification of pool and Diesel failures.
//!
//! Repositories translate a [`DbFailure`] into their own port error so the
//! domain never sees Diesel types. Raw database messages are logged here at
//! debug level and replaced with stable summaries.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Backend-agnostic failure category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DbFailure {
    Connection(String),
    Query(String),
    UniqueViolation(String),
}

pub(super) fn classify_pool(error: PoolError) -> DbFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DbFailure::Connection(message)
        }
    }
}

pub(super) fn classify(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DbFailure::Query("record not found".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFailure::UniqueViolation(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error".to_owned())
        }
        _ => DbFailure::Query("database error".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_connection_failures() {
        assert_eq!(
            classify_pool(PoolError::checkout("refused")),
            DbFailure::Connection("refused".to_owned())
        );
    }

    #[test]
    fn not_found_classifies_as_query_failure() {
        assert_eq!(
            classify(DieselError::NotFound),
            DbFailure::Query("record not found".to_owned())
        );
    }
}
