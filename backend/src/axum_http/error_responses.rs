use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Stable machine-readable error body. Internal failures are logged at the
/// usecase with full detail; the caller only ever sees the generic message.
pub fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        "Internal server error".to_string()
    } else {
        message
    };

    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            message,
        }),
    )
        .into_response()
}
