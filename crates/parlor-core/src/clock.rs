//! Time source for presence timestamps and message times.

use chrono::{DateTime, Local, Utc};
use parlor_types::message::format_time;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The current instant as a message `time` (`HH:MM:SS`, local zone).
    fn message_time(&self) -> String {
        format_time(&self.now().with_timezone(&Local))
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
