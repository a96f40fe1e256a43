use serde::Serialize;

use crate::SessionError;

/// JSON body returned when the session layer fails a request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<&SessionError> for ErrorResponse {
    fn from(err: &SessionError) -> Self {
        let code = match err {
            SessionError::Encode(_) => "SESSION_ENCODE_ERROR",
            SessionError::Encrypt => "SESSION_ENCRYPT_ERROR",
        };

        // details stay in the logs
        ErrorResponse {
            error: "Internal server error".to_owned(),
            code: code.to_owned(),
        }
    }
}
