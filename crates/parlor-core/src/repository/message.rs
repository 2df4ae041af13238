//! Message repository trait definition.

use parlor_types::error::RepositoryError;
use parlor_types::message::ChatMessage;

/// Repository trait for the append-only message log.
pub trait MessageRepository: Send + Sync {
    /// Append a message. No validation happens here.
    fn append(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<ChatMessage, RepositoryError>> + Send;

    /// All messages visible to `user`, oldest first.
    ///
    /// A message is visible when `to == user`, `from == user`, or its kind is
    /// `message` or `status`. See [`ChatMessage::is_visible_to`].
    fn list_visible_to(
        &self,
        user: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
