//! Newtype wrappers for domain identifiers.
//!
//! Twitter identifiers are decimal strings whose numeric value can exceed the
//! range of native integers. They are never parsed for comparison: the order
//! defined here compares string length first, then bytes, which matches numeric
//! order for digit strings without leading zeros.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Compares two decimal identifier strings by numeric value without parsing.
///
/// A shorter string is smaller. Strings of equal length compare
/// lexicographically.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Returns true if identifier `a` sorts strictly before identifier `b`.
///
/// ```
/// use dm_reshare::types::id_less_than;
///
/// assert!(id_less_than("9", "10"));
/// assert!(!id_less_than("10", "9"));
/// assert!(!id_less_than("10", "10"));
/// // The empty identifier sorts before everything else.
/// assert!(id_less_than("", "1"));
/// ```
pub fn id_less_than(a: &str, b: &str) -> bool {
    compare_ids(a, b) == Ordering::Less
}

/// The identifier of a direct message event.
///
/// Also used as the persisted watermark. The empty value means "nothing
/// processed yet" and sorts before every real identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(s: impl Into<String>) -> Self {
        EventId(s.into())
    }

    /// The empty identifier, meaning no event has been processed.
    pub fn empty() -> Self {
        EventId(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if this identifier is at or before `watermark`.
    ///
    /// Events for which this holds have already been processed.
    pub fn is_at_or_before(&self, watermark: &EventId) -> bool {
        !id_less_than(watermark.as_str(), self.as_str())
    }
}

impl Ord for EventId {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_ids(&self.0, &other.0)
    }
}

impl PartialOrd for EventId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        EventId(s)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        EventId(s.to_string())
    }
}

/// A Twitter user ID, as reported in the `sender_id` of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderId(pub String);

impl SenderId {
    pub fn new(s: impl Into<String>) -> Self {
        SenderId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SenderId {
    fn from(s: &str) -> Self {
        SenderId(s.to_string())
    }
}

/// The ID of a tweet referenced from a direct message.
///
/// Always a non-empty run of ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TweetId(String);

/// Error returned when a string is not a valid tweet ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tweet ID {0:?}: expected one or more ASCII digits")]
pub struct InvalidTweetId(pub String);

impl TweetId {
    /// Parses a tweet ID, checking that it is a non-empty digit string.
    pub fn parse(s: impl Into<String>) -> Result<Self, InvalidTweetId> {
        let s = s.into();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(TweetId(s))
        } else {
            Err(InvalidTweetId(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric value, or `None` if it does not fit in a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for TweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
