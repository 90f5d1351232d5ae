//! Error-to-response mapping for the HTTP boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use rentora_shared::AppError;

/// Wrapper that turns an [`AppError`] into an HTTP response.
///
/// Handlers return `Result<_, ApiError>` and propagate repository errors
/// with `?`. Status code and error code come from the taxonomy itself, so
/// access-denied and not-found stay indistinguishable here. Storage errors
/// may carry raw driver text; their message is logged and replaced before
/// it reaches the client.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_internal() {
            error!(error = %self.0, "request failed on storage");
            "An internal error occurred".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let resp = ApiError::from(AppError::Conflict("unit taken".into())).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = ApiError::from(AppError::Validation("bad period".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_denied_and_missing_share_a_status() {
        let denied = ApiError::from(AppError::AccessDenied("ticket".into())).into_response();
        let missing = ApiError::from(AppError::NotFound("ticket".into())).into_response();
        assert_eq!(denied.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_errors_map_to_5xx() {
        let resp = ApiError::from(AppError::Storage("pg driver text".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp =
            ApiError::from(AppError::TransientStorage("pool timeout".into())).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
