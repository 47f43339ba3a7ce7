use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parlor_auth::AuthError;
use parlor_chats::ChatError;
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Generic 500; the detail belongs in the log, not the response.
    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::InvalidArgument { message } => Self::bad_request(message),
            ChatError::AccessDenied { .. } => {
                warn!(error = %error, "access denied");
                Self::forbidden(error.to_string())
            }
            ChatError::ConversationNotFound { .. } | ChatError::MessageNotFound { .. } => {
                Self::not_found(error.to_string())
            }
            ChatError::Database(_) | ChatError::Internal { .. } => {
                error!(error = ?error, "chat error");
                Self::internal_server_error()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        if error.is_unauthenticated() {
            warn!(error = %error, "authentication failed");
            return Self::unauthorized(error.to_string());
        }

        error!(error = ?error, "auth error");
        Self::internal_server_error()
    }
}
