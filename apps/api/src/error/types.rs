use axum::http::StatusCode;
use serde::Serialize;

/// Error envelope. `code` always equals the HTTP status.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    code: u16,
    message: String,
}

impl ErrorResponse {
    pub(super) fn new(status: StatusCode, message: String) -> Self {
        Self {
            code: status.as_u16(),
            message,
        }
    }
}
