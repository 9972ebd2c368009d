//! Core domain types for the DM reshare bot.

pub mod event;
pub mod ids;

pub use event::{Cursor, EventKind, EventPage, InboxEvent, UrlEntity};
pub use ids::{EventId, InvalidTweetId, SenderId, TweetId, compare_ids, id_less_than};
