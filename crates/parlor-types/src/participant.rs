//! Participant types.
//!
//! A participant is a named entity currently present in the chat room.
//! Names are unique; the only mutable field is the last-seen timestamp.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum participant name length, counted after trimming.
pub const MAX_NAME_LEN: usize = 30;

/// A participant currently present in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    /// Refreshed on registration and on every heartbeat.
    pub last_seen_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(name: impl Into<String>, last_seen_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_seen_at,
        }
    }

    /// True when the participant has not been seen since `cutoff`.
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_seen_at < cutoff
    }
}

/// The instant before which a participant counts as stale.
///
/// `None` when `stale_after` reaches past the representable date range.
pub fn stale_cutoff(now: DateTime<Utc>, stale_after: Duration) -> Option<DateTime<Utc>> {
    let stale_after = chrono::Duration::from_std(stale_after).ok()?;
    now.checked_sub_signed(stale_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_is_stale() {
        let now = Utc::now();
        let p = Participant::new("alice", now - TimeDelta::seconds(11));
        assert!(p.is_stale(now - TimeDelta::seconds(10)));
        assert!(!p.is_stale(now - TimeDelta::seconds(20)));
    }

    #[test]
    fn test_stale_cutoff() {
        let now = Utc::now();
        assert_eq!(
            stale_cutoff(now, Duration::from_secs(10)),
            Some(now - TimeDelta::seconds(10))
        );
    }

    #[test]
    fn test_stale_cutoff_out_of_range() {
        let now = Utc::now();
        assert_eq!(stale_cutoff(now, Duration::from_secs(10_000_000_000_000)), None);
        assert_eq!(stale_cutoff(now, Duration::from_secs(u64::MAX)), None);
    }

    #[test]
    fn test_participant_serializes_camel_case() {
        let p = Participant::new("alice", Utc::now());
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["name"], "alice");
        assert!(json.get("lastSeenAt").is_some());
    }
}
