use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use finplan_core::{ErrorResponse, ProxyError};

/// A failed proxy call as the HTTP caller sees it.
///
/// The body carries a generic message only; details stay in the server log.
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<&ProxyError> for ApiError {
    fn from(e: &ProxyError) -> Self {
        if e.is_timeout() {
            Self {
                status: StatusCode::GATEWAY_TIMEOUT,
                message: "The request took too long. Please try again.",
            }
        } else {
            Self {
                status: StatusCode::BAD_GATEWAY,
                message: "The request could not be completed. Please try again.",
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message.to_string(),
            }),
        )
            .into_response()
    }
}
