//! Message log.
//!
//! Appends chat events and answers "what can this participant read".
//! Posting and reading both require the caller to be a current participant.

use std::sync::Arc;

use parlor_types::error::{MessageError, RepositoryError};
use parlor_types::message::ChatMessage;
use serde_json::Value;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::repository::message::MessageRepository;
use crate::repository::participant::ParticipantRepository;
use crate::validation::validate_message_body;

/// Orchestrates message persistence and visibility.
pub struct MessageService<M: MessageRepository, P: ParticipantRepository> {
    message_repo: M,
    participant_repo: P,
    clock: Arc<dyn Clock>,
}

impl<M: MessageRepository, P: ParticipantRepository> MessageService<M, P> {
    pub fn new(message_repo: M, participant_repo: P) -> Self {
        Self::with_clock(message_repo, participant_repo, Arc::new(SystemClock))
    }

    pub fn with_clock(message_repo: M, participant_repo: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_repo,
            participant_repo,
            clock,
        }
    }

    /// Append a message as-is. Callers validate.
    pub async fn append(&self, message: &ChatMessage) -> Result<ChatMessage, MessageError> {
        self.message_repo.append(message).await.map_err(storage)
    }

    /// Validate a `{to, text, type}` body and post it as `sender`.
    ///
    /// Returns the stored message so the API can echo it.
    pub async fn post(&self, sender: &str, body: &Value) -> Result<ChatMessage, MessageError> {
        let valid = validate_message_body(body).map_err(MessageError::Invalid)?;

        if !self.is_participant(sender).await? {
            return Err(MessageError::UnknownSender(sender.to_string()));
        }

        let message = ChatMessage {
            from: sender.to_string(),
            to: valid.to,
            text: valid.text,
            kind: valid.kind,
            time: self.clock.message_time(),
        };

        let message = self.append(&message).await?;
        debug!(from = %message.from, to = %message.to, kind = %message.kind, "Message posted");
        Ok(message)
    }

    /// Messages visible to `user`, oldest first.
    ///
    /// With `limit`, only the latest `limit` of them are returned (still
    /// oldest first).
    pub async fn list_visible_to(
        &self,
        user: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, MessageError> {
        if !self.is_participant(user).await? {
            return Err(MessageError::UnknownUser(user.to_string()));
        }

        let messages = self
            .message_repo
            .list_visible_to(user)
            .await
            .map_err(storage)?;

        Ok(tail(messages, limit))
    }

    async fn is_participant(&self, name: &str) -> Result<bool, MessageError> {
        Ok(self
            .participant_repo
            .get(name)
            .await
            .map_err(storage)?
            .is_some())
    }
}

/// Keep the last `limit` items of an ordered sequence.
pub fn tail<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(n) if n < items.len() => items.split_off(items.len() - n),
        _ => items,
    }
}

fn storage(e: RepositoryError) -> MessageError {
    MessageError::StorageError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, ManualClock};
    use chrono::{Local, TimeZone, Utc};
    use parlor_types::message::{BROADCAST, MessageKind, format_time};
    use parlor_types::participant::Participant;
    use serde_json::json;

    fn service(names: &[&str]) -> (MessageService<InMemoryStore, InMemoryStore>, InMemoryStore) {
        let store = InMemoryStore::default();
        for name in names {
            store.seed(Participant::new(*name, Utc::now()));
        }
        (MessageService::new(store.clone(), store.clone()), store)
    }

    fn texts(messages: &[ChatMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail(vec![1, 2, 3, 4], Some(2)), [3, 4]);
        assert_eq!(tail(vec![1, 2], Some(5)), [1, 2]);
        assert_eq!(tail(vec![1, 2], None), [1, 2]);
        assert!(tail(vec![1, 2], Some(0)).is_empty());
    }

    #[tokio::test]
    async fn test_post_echoes_stored_message() {
        let (log, _) = service(&["alice"]);
        let msg = log
            .post("alice", &json!({ "to": "Todos", "text": " hi ", "type": "message" }))
            .await
            .unwrap();
        assert_eq!(msg.from, "alice");
        assert_eq!(msg.to, BROADCAST);
        assert_eq!(msg.text, "hi");
        assert_eq!(msg.kind, MessageKind::Message);
        assert_eq!(msg.time.len(), 8);
    }

    #[tokio::test]
    async fn test_post_unknown_sender() {
        let (log, store) = service(&[]);
        let err = log
            .post("mallory", &json!({ "to": "Todos", "text": "hi", "type": "message" }))
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::UnknownSender(_)));
        assert!(store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_post_invalid_payload_lists_all_violations() {
        let (log, _) = service(&["alice"]);
        let err = log
            .post("alice", &json!({ "to": " ", "type": "yell" }))
            .await
            .unwrap_err();
        match err {
            MessageError::Invalid(errs) => assert_eq!(errs.len(), 3),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_private_message_visibility() {
        let (log, _) = service(&["alice", "bob", "carol"]);
        log.post("alice", &json!({ "to": "bob", "text": "psst", "type": "private_message" }))
            .await
            .unwrap();

        assert_eq!(texts(&log.list_visible_to("alice", None).await.unwrap()), ["psst"]);
        assert_eq!(texts(&log.list_visible_to("bob", None).await.unwrap()), ["psst"]);
        assert!(log.list_visible_to("carol", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_public_message_visible_to_all() {
        let (log, _) = service(&["alice", "bob", "carol"]);
        log.post("alice", &json!({ "to": "bob", "text": "hello bob", "type": "message" }))
            .await
            .unwrap();
        assert_eq!(
            texts(&log.list_visible_to("carol", None).await.unwrap()),
            ["hello bob"]
        );
    }

    #[tokio::test]
    async fn test_limit_keeps_latest_in_order() {
        let (log, _) = service(&["alice", "bob", "carol"]);
        for (i, kind) in ["message", "private_message", "message", "message"]
            .into_iter()
            .enumerate()
        {
            log.post("alice", &json!({ "to": "bob", "text": format!("m{i}"), "type": kind }))
                .await
                .unwrap();
        }

        // carol cannot see m1, so her latest two are m2, m3
        let visible = log.list_visible_to("carol", Some(2)).await.unwrap();
        assert_eq!(texts(&visible), ["m2", "m3"]);

        let visible = log.list_visible_to("bob", Some(3)).await.unwrap();
        assert_eq!(texts(&visible), ["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn test_list_unknown_user() {
        let (log, _) = service(&[]);
        let err = log.list_visible_to("ghost", None).await.unwrap_err();
        assert!(matches!(err, MessageError::UnknownUser(_)));
    }

    #[tokio::test]
    async fn test_each_post_is_stamped_when_made() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let clock = ManualClock::at(start);
        let store = InMemoryStore::default();
        store.seed(Participant::new("alice", start));
        let log = MessageService::with_clock(store.clone(), store.clone(), Arc::new(clock.clone()));
        let body = json!({ "to": "Todos", "text": "hi", "type": "message" });

        let first = log.post("alice", &body).await.unwrap();
        clock.advance(chrono::Duration::seconds(95));
        let second = log.post("alice", &body).await.unwrap();

        assert_eq!(first.time, format_time(&start.with_timezone(&Local)));
        assert_eq!(
            second.time,
            format_time(&(start + chrono::Duration::seconds(95)).with_timezone(&Local))
        );
        assert_ne!(first.time, second.time);
    }
}
