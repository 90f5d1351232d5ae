//! Application-wide error types.
//!
//! The taxonomy distinguishes `AccessDenied` from `NotFound` internally so
//! audits can tell a policy exclusion apart from a genuinely missing row.
//! The HTTP boundary collapses both to 404 to avoid revealing the existence
//! of out-of-scope data.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request carried no valid context (missing or bad token).
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The policy predicate excluded the row for this context.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// No row matches the identifier regardless of policy.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input rejected before any query was issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A domain invariant would be violated (duplicate slug, unit taken,
    /// share sum over 100, blocking relations on delete).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transient connection or timeout error; reads may be retried.
    #[error("Transient storage error: {0}")]
    TransientStorage(String),

    /// Non-transient storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    ///
    /// `AccessDenied` deliberately maps to 404, identical to `NotFound`.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::AccessDenied(_) | Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::TransientStorage(_) => 503,
            Self::Storage(_) => 500,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            // Unified on purpose: the response must not reveal whether the
            // row exists outside the caller's scope.
            Self::AccessDenied(_) | Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::TransientStorage(_) => "SERVICE_UNAVAILABLE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if the error may carry raw storage-driver text and must
    /// not be echoed to clients.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::TransientStorage(_) | Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Unauthorized(String::new()).status_code(), 401);
        assert_eq!(AppError::AccessDenied(String::new()).status_code(), 404);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::TransientStorage(String::new()).status_code(), 503);
        assert_eq!(AppError::Storage(String::new()).status_code(), 500);
    }

    #[test]
    fn test_access_denied_indistinguishable_from_not_found() {
        let denied = AppError::AccessDenied("ticket".into());
        let missing = AppError::NotFound("ticket".into());

        assert_eq!(denied.status_code(), missing.status_code());
        assert_eq!(denied.error_code(), missing.error_code());
    }

    #[test]
    fn test_internal_errors_flagged() {
        assert!(AppError::Storage(String::new()).is_internal());
        assert!(AppError::TransientStorage(String::new()).is_internal());
        assert!(!AppError::Conflict(String::new()).is_internal());
        assert!(!AppError::NotFound(String::new()).is_internal());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Conflict("unit 4B is occupied".into()).to_string(),
            "Conflict: unit 4B is occupied"
        );
        assert_eq!(
            AppError::Validation("bad period".into()).to_string(),
            "Validation error: bad period"
        );
    }
}
