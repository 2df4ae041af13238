use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors from repository operations (used by trait definitions in parlor-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to participant presence.
#[derive(Debug, Error)]
pub enum ParticipantError {
    #[error("invalid participant: {0}")]
    Invalid(ValidationErrors),

    #[error("name '{0}' already exists")]
    Conflict(String),

    #[error("participant '{0}' not found")]
    NotFound(String),

    #[error("invalid staleness threshold: {0}")]
    InvalidThreshold(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to posting and reading messages.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid message: {0}")]
    Invalid(ValidationErrors),

    #[error("sender '{0}' is not a participant")]
    UnknownSender(String),

    #[error("user '{0}' is not a participant")]
    UnknownUser(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Rule, Violation};

    #[test]
    fn test_participant_error_display() {
        let err = ParticipantError::Conflict("alice".to_string());
        assert_eq!(err.to_string(), "name 'alice' already exists");
    }

    #[test]
    fn test_message_error_display_includes_violations() {
        let err = MessageError::Invalid(ValidationErrors(vec![Violation::new(
            "text",
            Rule::NotEmpty,
            "must not be empty",
        )]));
        assert_eq!(err.to_string(), "invalid message: text: must not be empty");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
