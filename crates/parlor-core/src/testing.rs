//! In-memory store for service and reaper tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use parlor_types::error::RepositoryError;
use parlor_types::message::ChatMessage;
use parlor_types::participant::Participant;

use crate::clock::Clock;
use crate::repository::message::MessageRepository;
use crate::repository::participant::ParticipantRepository;

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(now)))
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct State {
    participants: Vec<Participant>,
    messages: Vec<ChatMessage>,
    evict_failures: HashSet<String>,
}

/// Implements both repositories over shared vectors. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn seed(&self, participant: Participant) {
        self.state.lock().unwrap().participants.push(participant);
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_evict_for(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .evict_failures
            .insert(name.to_string());
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), RepositoryError> {
        if flag.load(Ordering::SeqCst) {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }
}

impl ParticipantRepository for InMemoryStore {
    async fn create(
        &self,
        participant: &Participant,
        arrival: &ChatMessage,
    ) -> Result<Participant, RepositoryError> {
        self.check(&self.fail_writes)?;
        let mut state = self.state.lock().unwrap();
        if state.participants.iter().any(|p| p.name == participant.name) {
            return Err(RepositoryError::Conflict(participant.name.clone()));
        }
        state.participants.push(participant.clone());
        state.messages.push(arrival.clone());
        Ok(participant.clone())
    }

    async fn get(&self, name: &str) -> Result<Option<Participant>, RepositoryError> {
        self.check(&self.fail_reads)?;
        let state = self.state.lock().unwrap();
        Ok(state.participants.iter().find(|p| p.name == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Participant>, RepositoryError> {
        self.check(&self.fail_reads)?;
        Ok(self.state.lock().unwrap().participants.clone())
    }

    async fn touch(&self, name: &str, at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        self.check(&self.fail_writes)?;
        let mut state = self.state.lock().unwrap();
        match state.participants.iter_mut().find(|p| p.name == name) {
            Some(p) => {
                p.last_seen_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn evict(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
        departure: &ChatMessage,
    ) -> Result<bool, RepositoryError> {
        self.check(&self.fail_writes)?;
        let mut state = self.state.lock().unwrap();
        if state.evict_failures.contains(name) {
            return Err(RepositoryError::Query(format!("evict {name} failed")));
        }
        let before = state.participants.len();
        state
            .participants
            .retain(|p| !(p.name == name && p.is_stale(cutoff)));
        if state.participants.len() == before {
            return Ok(false);
        }
        state.messages.push(departure.clone());
        Ok(true)
    }
}

impl MessageRepository for InMemoryStore {
    async fn append(&self, message: &ChatMessage) -> Result<ChatMessage, RepositoryError> {
        self.check(&self.fail_writes)?;
        self.state.lock().unwrap().messages.push(message.clone());
        Ok(message.clone())
    }

    async fn list_visible_to(&self, user: &str) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.check(&self.fail_reads)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .filter(|m| m.is_visible_to(user))
            .cloned()
            .collect())
    }
}
