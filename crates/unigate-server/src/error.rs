//! HTTP error mapping for orchestrator results.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use unigate_core::error::UnigateError;

/// Wrapper turning core errors into HTTP responses.
///
/// Not-found → 404, conflict/validation/OTP mismatch → 400,
/// credential failure → 401, everything else → 500.
#[derive(Debug)]
pub struct ApiError(pub UnigateError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<UnigateError> for ApiError {
    fn from(err: UnigateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            UnigateError::NotFound { .. } => StatusCode::NOT_FOUND,
            UnigateError::AlreadyExists { .. }
            | UnigateError::Validation { .. }
            | UnigateError::OtpMismatch => StatusCode::BAD_REQUEST,
            UnigateError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            UnigateError::Delivery(_)
            | UnigateError::Database(_)
            | UnigateError::Crypto(_)
            | UnigateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: UnigateError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = UnigateError::NotFound {
            entity: "user".into(),
            id: "username=nobody".into(),
        };
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflicts_and_validation_map_to_400() {
        assert_eq!(
            status_of(UnigateError::AlreadyExists {
                entity: "username".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(UnigateError::Validation {
                message: "weak password".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(UnigateError::OtpMismatch), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn credential_failure_maps_to_401() {
        let err = UnigateError::AuthenticationFailed {
            reason: "invalid credentials".into(),
        };
        assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn delivery_failure_maps_to_500() {
        assert_eq!(
            status_of(UnigateError::Delivery("smtp unavailable".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
