//! Storage error classification.
//!
//! Raw driver errors never cross the repository boundary. Connection and
//! acquire failures become `TransientStorage` (callers may retry reads);
//! everything else becomes `Storage`. The driver text is logged here and
//! replaced with a stable message.

use rentora_shared::error::AppError;
use sea_orm::{DbErr, SqlErr};

/// Classifies a `SeaORM` error into the application error taxonomy.
#[must_use]
pub fn storage_error(err: DbErr) -> AppError {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
            tracing::warn!(error = %err, "transient storage failure");
            AppError::TransientStorage("storage temporarily unavailable".to_string())
        }
        _ => {
            tracing::error!(error = %err, "storage failure");
            AppError::Storage("storage operation failed".to_string())
        }
    }
}

/// Returns true if the error is a unique-constraint violation.
///
/// Used where a unique index backs a domain rule (organization slug, user
/// email, contract number, consumption natural key) so the violation can
/// surface as a `Conflict` instead of an opaque storage error.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Internal repository error: either a domain error or a raw storage
/// error awaiting classification. Lets repository bodies use `?` on both
/// `SeaORM` calls and domain checks, with one conversion at the public
/// boundary.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RepoError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::App(app) => app,
            RepoError::Db(db) => storage_error(db),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_errors_are_transient() {
        let err = storage_error(DbErr::Conn(sea_orm::RuntimeErr::Internal(
            "connection refused".to_string(),
        )));
        assert!(matches!(err, AppError::TransientStorage(_)));
    }

    #[test]
    fn test_other_errors_are_storage() {
        let err = storage_error(DbErr::Custom("boom".to_string()));
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn test_driver_text_never_escapes() {
        let err = storage_error(DbErr::Custom(
            "relation \"secret_table\" does not exist".to_string(),
        ));
        assert!(!err.to_string().contains("secret_table"));
    }
}
