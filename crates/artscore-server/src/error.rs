use artscore_core::errors::CoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// HTTP rendering of a [`CoreError`].
///
/// Validation failures keep the flat `{ "error": "..." }` body the browser
/// client checks for; everything else is a 500 with `{ "error": { "message",
/// "details"? } }`.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            CoreError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            CoreError::Upstream {
                message,
                details: Some(details),
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": message, "details": details } })),
            )
                .into_response(),
            CoreError::Upstream {
                message,
                details: None,
            }
            | CoreError::Config(message)
            | CoreError::Io(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": message } })),
            )
                .into_response(),
        }
    }
}
