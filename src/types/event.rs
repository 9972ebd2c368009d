//! Inbox event types produced by the feed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{EventId, SenderId};

/// The kind of a direct message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A message was sent. The only kind the bot acts on.
    MessageCreate,
    /// Any other event type, carrying the raw tag.
    Other(String),
}

impl EventKind {
    /// Maps a wire type tag to an event kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "message_create" => EventKind::MessageCreate,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, EventKind::MessageCreate)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::MessageCreate => write!(f, "message_create"),
            EventKind::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// A link embedded in a message, after the platform has expanded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntity {
    pub expanded_url: String,
}

impl UrlEntity {
    pub fn new(expanded_url: impl Into<String>) -> Self {
        UrlEntity {
            expanded_url: expanded_url.into(),
        }
    }
}

/// A single event from the direct message inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub sender: SenderId,
    pub text: String,
    pub links: Vec<UrlEntity>,
}

/// Opaque pagination token for the inbox feed.
///
/// Empty means "first page" when sent and "no more pages" when received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn new(s: impl Into<String>) -> Self {
        Cursor(s.into())
    }

    /// The cursor for the newest page.
    pub fn start() -> Self {
        Cursor(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_end(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of inbox events, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    pub events: Vec<InboxEvent>,
    pub next_cursor: Cursor,
}
