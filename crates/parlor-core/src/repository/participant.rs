//! Participant repository trait definition.

use chrono::{DateTime, Utc};
use parlor_types::error::RepositoryError;
use parlor_types::message::ChatMessage;
use parlor_types::participant::Participant;

/// Repository trait for participant persistence.
///
/// Implementations must enforce name uniqueness at the store level so that
/// `create` is an atomic insert-if-absent. Uses native async fn in traits
/// (Rust 2024 edition, no async_trait macro).
pub trait ParticipantRepository: Send + Sync {
    /// Insert a participant together with its arrival announcement.
    ///
    /// Both writes commit or neither does. Returns
    /// `RepositoryError::Conflict` if the name is already taken.
    fn create(
        &self,
        participant: &Participant,
        arrival: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<Participant, RepositoryError>> + Send;

    /// Get a participant by exact (case-sensitive) name.
    fn get(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Participant>, RepositoryError>> + Send;

    /// List all participants in insertion order.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Participant>, RepositoryError>> + Send;

    /// Set `last_seen_at` for a participant. Returns false if no such participant.
    fn touch(
        &self,
        name: &str,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove a participant that is still stale and append its departure.
    ///
    /// The delete only applies if `last_seen_at < cutoff` at write time, so a
    /// heartbeat that lands between scan and eviction wins. Returns whether
    /// the participant was removed; the departure is appended only if so.
    fn evict(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
        departure: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
