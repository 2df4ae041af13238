//! Chat message types for Parlor.
//!
//! Messages are immutable once written. `from`/`to` reference participant
//! names by value, so history survives a participant leaving the room.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Reserved recipient meaning "all participants".
pub const BROADCAST: &str = "Todos";

/// Status text appended when a participant joins.
pub const ARRIVAL_TEXT: &str = "entra na sala...";

/// Status text appended when a participant is reaped.
pub const DEPARTURE_TEXT: &str = "sai da sala...";

/// Kind of chat event.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (kind IN ('status', 'message', 'private_message'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// System-generated join/leave announcement.
    Status,
    /// Public chat.
    Message,
    /// Direct message, visible to sender and addressee only.
    PrivateMessage,
}

impl MessageKind {
    pub const ALL: [MessageKind; 3] = [
        MessageKind::Status,
        MessageKind::Message,
        MessageKind::PrivateMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Status => "status",
            MessageKind::Message => "message",
            MessageKind::PrivateMessage => "private_message",
        }
    }

    /// Kinds every participant can read regardless of `to`/`from`.
    pub fn is_public(&self) -> bool {
        matches!(self, MessageKind::Status | MessageKind::Message)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    /// Exact match only: the wire tags are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(MessageKind::Status),
            "message" => Ok(MessageKind::Message),
            "private_message" => Ok(MessageKind::PrivateMessage),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

/// A single chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Human-readable `HH:MM:SS`, captured at insertion.
    pub time: String,
}

impl ChatMessage {
    /// Status announcement that `name` joined the room.
    pub fn arrival(name: &str, time: String) -> Self {
        Self::status(name, ARRIVAL_TEXT, time)
    }

    /// Status announcement that `name` left the room.
    pub fn departure(name: &str, time: String) -> Self {
        Self::status(name, DEPARTURE_TEXT, time)
    }

    fn status(name: &str, text: &str, time: String) -> Self {
        Self {
            from: name.to_string(),
            to: BROADCAST.to_string(),
            text: text.to_string(),
            kind: MessageKind::Status,
            time,
        }
    }

    /// Whether `user` may read this message.
    ///
    /// Visible when addressed to or sent by `user`, or when the kind is
    /// public (`message`, `status`). Private messages never match on kind.
    pub fn is_visible_to(&self, user: &str) -> bool {
        self.to == user || self.from == user || self.kind.is_public()
    }
}

/// Format an instant as the `HH:MM:SS` wall-clock time stored on messages.
pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%H:%M:%S").to_string()
}
