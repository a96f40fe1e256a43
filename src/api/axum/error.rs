use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::SessionError;
use crate::api::ErrorResponse;

/// Why the session layer could not serve a request. Always a server-side
/// problem, so every variant renders as `500 Internal Server Error`.
#[derive(Debug, thiserror::Error)]
pub enum SessionRejection {
    #[error("session middleware is not installed on this route")]
    MissingMiddleware,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("session cookie is not a valid header value")]
    InvalidHeader,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        log::error!(target: "sealed_session", "msg=\"session rejection\" error=\"{self}\"");

        let body = match &self {
            SessionRejection::Session(err) => ErrorResponse::from(err),
            SessionRejection::MissingMiddleware => ErrorResponse {
                error: "Internal server error".to_owned(),
                code: "SESSION_MIDDLEWARE_MISSING".to_owned(),
            },
            SessionRejection::InvalidHeader => ErrorResponse {
                error: "Internal server error".to_owned(),
                code: "SESSION_INVALID_HEADER".to_owned(),
            },
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
