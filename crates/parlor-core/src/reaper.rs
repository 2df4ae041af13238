//! Background eviction of silent participants.
//!
//! The reaper wakes on a fixed interval, scans the roster for participants
//! whose last heartbeat is older than the staleness threshold, and evicts
//! them with a departure announcement. It cycles `idle -> scanning ->
//! evicting -> idle` until its cancellation token fires.
//!
//! A cycle never overlaps another: ticks missed while a cycle runs are
//! skipped, and a `run_cycle` call made while one is in flight returns
//! [`CycleOutcome::Skipped`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use parlor_types::config::ReaperConfig;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::repository::participant::ParticipantRepository;
use crate::service::presence::{PresenceService, ReapReport};

/// Shortest period the ticker accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Phase of the reaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaperState {
    Idle,
    Scanning,
    Evicting,
}

impl ReaperState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ReaperState::Scanning,
            2 => ReaperState::Evicting,
            _ => ReaperState::Idle,
        }
    }
}

/// Result of one call to [`Reaper::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CycleOutcome {
    Completed(ReapReport),
    /// Another cycle was already running.
    Skipped,
    /// The roster could not be loaded; nothing was evicted.
    Aborted { reason: String },
}

/// Periodic stale-participant evictor.
pub struct Reaper<P: ParticipantRepository> {
    presence: Arc<PresenceService<P>>,
    config: ReaperConfig,
    state: AtomicU8,
    running: AtomicBool,
}

impl<P: ParticipantRepository + 'static> Reaper<P> {
    pub fn new(presence: Arc<PresenceService<P>>, config: ReaperConfig) -> Self {
        Self {
            presence,
            config,
            state: AtomicU8::new(ReaperState::Idle as u8),
            running: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ReaperState {
        ReaperState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ReaperState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Run one scan-and-evict cycle now.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Reaper cycle already in progress, skipping");
            return CycleOutcome::Skipped;
        }
        let _guard = CycleGuard(self);

        self.set_state(ReaperState::Scanning);
        let scan = match self.presence.scan_stale(self.config.stale_after()).await {
            Ok(scan) => scan,
            Err(e) => {
                error!(error = %e, "Reaper scan failed, retrying next cycle");
                return CycleOutcome::Aborted {
                    reason: e.to_string(),
                };
            }
        };

        self.set_state(ReaperState::Evicting);
        let report = self.presence.evict_all(scan).await;

        if report.evicted.is_empty() && report.failed.is_empty() {
            debug!(scanned = report.scanned, "Reaper cycle complete");
        } else {
            info!(
                scanned = report.scanned,
                evicted = report.evicted.len(),
                failed = report.failed.len(),
                "Reaper cycle complete"
            );
        }

        CycleOutcome::Completed(report)
    }

    /// Spawn the periodic loop. The first cycle runs one interval after start.
    pub fn start(self: Arc<Self>, token: CancellationToken) -> ReaperHandle {
        let period = self.config.interval().max(MIN_INTERVAL);
        let loop_token = token.clone();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            info!(
                interval_ms = period.as_millis() as u64,
                stale_after_secs = self.config.stale_after_secs,
                "Reaper started"
            );

            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        self.run_cycle().await;
                    }
                }
            }

            info!("Reaper stopped");
        });

        ReaperHandle { token, join }
    }
}

/// Returns the reaper to idle when a cycle ends, however it ends.
struct CycleGuard<'a, P: ParticipantRepository>(&'a Reaper<P>);

impl<P: ParticipantRepository> Drop for CycleGuard<'_, P> {
    fn drop(&mut self) {
        self.0.state.store(ReaperState::Idle as u8, Ordering::Release);
        self.0.running.store(false, Ordering::Release);
    }
}

/// Handle to a running reaper loop.
pub struct ReaperHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl ReaperHandle {
    /// Cancel the loop and wait for any in-flight cycle to finish.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.join.await {
            error!(error = %e, "Reaper task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
