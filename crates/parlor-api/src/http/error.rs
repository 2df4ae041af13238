//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use parlor_types::error::{MessageError, ParticipantError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Presence registry errors.
    Participant(ParticipantError),
    /// Message log errors.
    Message(MessageError),
}

impl From<ParticipantError> for AppError {
    fn from(e: ParticipantError) -> Self {
        AppError::Participant(e)
    }
}

impl From<MessageError> for AppError {
    fn from(e: MessageError) -> Self {
        AppError::Message(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            AppError::Participant(ParticipantError::Invalid(errs))
            | AppError::Message(MessageError::Invalid(errs)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                errs.to_string(),
                serde_json::to_value(errs).ok(),
            ),
            AppError::Participant(ParticipantError::Conflict(name)) => (
                StatusCode::CONFLICT,
                "NAME_CONFLICT",
                format!("Name '{name}' already exists"),
                None,
            ),
            AppError::Participant(ParticipantError::NotFound(name)) => (
                StatusCode::NOT_FOUND,
                "PARTICIPANT_NOT_FOUND",
                format!("Participant '{name}' not found"),
                None,
            ),
            AppError::Message(MessageError::UnknownSender(name)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNKNOWN_SENDER",
                format!("Sender '{name}' is not a participant"),
                None,
            ),
            AppError::Message(MessageError::UnknownUser(name)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNKNOWN_USER",
                format!("User '{name}' is not a participant"),
                None,
            ),
            AppError::Participant(e @ ParticipantError::StorageError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_UNAVAILABLE",
                e.to_string(),
                None,
            ),
            AppError::Participant(e @ ParticipantError::InvalidThreshold(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.to_string(),
                None,
            ),
            AppError::Message(e @ MessageError::StorageError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_UNAVAILABLE",
                e.to_string(),
                None,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        let body = json!({ "errors": [error] });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
