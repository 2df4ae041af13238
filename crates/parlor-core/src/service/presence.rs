//! Presence registry.
//!
//! Owns the participant lifecycle: registration (with its arrival
//! announcement), existence checks, heartbeats, and stale-participant
//! eviction (with its departure announcement).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parlor_types::error::{ParticipantError, RepositoryError};
use parlor_types::message::ChatMessage;
use parlor_types::participant::{Participant, stale_cutoff};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::repository::participant::ParticipantRepository;
use crate::validation::validate_participant_name;

/// Participants found stale by one scan.
#[derive(Debug, Clone)]
pub struct StaleScan {
    /// Anyone last seen before this instant is stale.
    pub cutoff: DateTime<Utc>,
    /// Size of the roster at scan time.
    pub scanned: usize,
    /// Stale participants in scan order.
    pub stale: Vec<Participant>,
}

/// Outcome of one eviction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReapReport {
    pub scanned: usize,
    /// Names removed, in scan order.
    pub evicted: Vec<String>,
    /// Names whose eviction failed; retried next cycle.
    pub failed: Vec<String>,
}

/// Service managing who is in the room.
///
/// Generic over `ParticipantRepository` so that parlor-core never depends on
/// parlor-infra.
pub struct PresenceService<P: ParticipantRepository> {
    repo: P,
    clock: Arc<dyn Clock>,
}

impl<P: ParticipantRepository> PresenceService<P> {
    pub fn new(repo: P) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: P, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Register a participant from the raw `name` field of a request.
    ///
    /// 1. Validates the name (all violations reported)
    /// 2. Inserts the participant with `last_seen_at = now`
    /// 3. Appends the arrival status message in the same transaction
    ///
    /// Uniqueness is decided by the store's insert, not by a prior lookup.
    pub async fn register(&self, name: Option<&Value>) -> Result<Participant, ParticipantError> {
        let name = validate_participant_name(name).map_err(ParticipantError::Invalid)?;
        let name = name.into_inner();

        let participant = Participant::new(name.clone(), self.clock.now());
        let arrival = ChatMessage::arrival(&name, self.clock.message_time());

        let participant = self
            .repo
            .create(&participant, &arrival)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ParticipantError::Conflict(name.clone()),
                other => ParticipantError::StorageError(other.to_string()),
            })?;

        info!(name = %participant.name, "Participant joined");
        Ok(participant)
    }

    /// All current participants, in store insertion order.
    pub async fn list_participants(&self) -> Result<Vec<Participant>, ParticipantError> {
        self.repo.list().await.map_err(storage)
    }

    /// Exact-match existence check.
    pub async fn exists(&self, name: &str) -> Result<bool, ParticipantError> {
        Ok(self.repo.get(name).await.map_err(storage)?.is_some())
    }

    /// Refresh `last_seen_at` for `name`.
    pub async fn heartbeat(&self, name: &str) -> Result<(), ParticipantError> {
        let touched = self.repo.touch(name, self.clock.now()).await.map_err(storage)?;
        if touched {
            debug!(name = %name, "Heartbeat");
            Ok(())
        } else {
            Err(ParticipantError::NotFound(name.to_string()))
        }
    }

    /// Load the roster and select everyone silent for longer than `stale_after`.
    ///
    /// A failure here aborts the whole reap, as does a threshold reaching
    /// past the representable date range.
    pub async fn scan_stale(&self, stale_after: Duration) -> Result<StaleScan, ParticipantError> {
        let cutoff = stale_cutoff(self.clock.now(), stale_after).ok_or_else(|| {
            ParticipantError::InvalidThreshold(format!("{}s is out of range", stale_after.as_secs()))
        })?;

        let participants = self.list_participants().await?;
        let scanned = participants.len();
        let stale = participants
            .into_iter()
            .filter(|p| p.is_stale(cutoff))
            .collect();

        Ok(StaleScan {
            cutoff,
            scanned,
            stale,
        })
    }

    /// Evict every participant in `scan`, appending a departure for each.
    ///
    /// Per-participant failures are logged and collected; the pass continues.
    pub async fn evict_all(&self, scan: StaleScan) -> ReapReport {
        let mut report = ReapReport {
            scanned: scan.scanned,
            ..ReapReport::default()
        };

        for participant in scan.stale {
            let departure = ChatMessage::departure(&participant.name, self.clock.message_time());
            match self
                .repo
                .evict(&participant.name, scan.cutoff, &departure)
                .await
            {
                Ok(true) => {
                    info!(name = %participant.name, "Participant left (stale)");
                    report.evicted.push(participant.name);
                }
                Ok(false) => {
                    debug!(name = %participant.name, "Participant refreshed or gone before eviction");
                }
                Err(e) => {
                    warn!(name = %participant.name, error = %e, "Failed to evict participant");
                    report.failed.push(participant.name);
                }
            }
        }

        report
    }

    /// Scan and evict in one call.
    pub async fn reap_stale(&self, stale_after: Duration) -> Result<ReapReport, ParticipantError> {
        let scan = self.scan_stale(stale_after).await?;
        Ok(self.evict_all(scan).await)
    }
}

fn storage(e: RepositoryError) -> ParticipantError {
    ParticipantError::StorageError(e.to_string())
}
