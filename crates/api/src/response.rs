//! JSON response envelope and error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use stockline_domain::StocklineError;

/// Uniform `{success, message, data}` envelope for all endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Build a successful envelope.
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self { success: true, message: message.into(), data: Some(data) })
    }
}

/// Wrapper mapping domain errors onto HTTP status codes.
#[derive(Debug)]
pub struct ApiError(pub StocklineError);

impl From<StocklineError> for ApiError {
    fn from(err: StocklineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StocklineError::NotConnected(_) | StocklineError::RefreshFailed(_) => {
                StatusCode::UNAUTHORIZED
            }
            StocklineError::RemoteAuth(_)
            | StocklineError::InvalidState(_)
            | StocklineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StocklineError::NotFound(_) => StatusCode::NOT_FOUND,
            StocklineError::Forbidden(_) => StatusCode::FORBIDDEN,
            StocklineError::RemoteApi(_) => StatusCode::BAD_GATEWAY,
            StocklineError::Config(_) | StocklineError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "success": false,
            "message": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: StocklineError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn maps_errors_to_expected_statuses() {
        assert_eq!(status_of(StocklineError::NotConnected("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(StocklineError::RefreshFailed("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(StocklineError::RemoteAuth("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(StocklineError::InvalidState("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(StocklineError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(StocklineError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(StocklineError::RemoteApi("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(StocklineError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
