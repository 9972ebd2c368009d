//! Capability traits for the Twitter operations the bot needs.
//!
//! The poll cycle only talks to Twitter through these two traits, so it can be
//! exercised with in-memory fakes. [`TwitterClient`](super::TwitterClient)
//! implements both against the real API.

use std::future::Future;

use crate::types::{Cursor, EventPage, TweetId};

use super::error::TwitterApiError;

/// A paginated, newest-first feed of direct message events.
pub trait InboxFeed {
    /// Fetches one page of events.
    ///
    /// An empty `cursor` requests the newest page. A throttled request must
    /// fail with [`TwitterErrorKind::Throttled`](super::TwitterErrorKind::Throttled)
    /// so the caller can tell it apart from other failures.
    fn fetch_page(
        &self,
        cursor: &Cursor,
        page_size: u32,
    ) -> impl Future<Output = Result<EventPage, TwitterApiError>> + Send;
}

/// The follow-up action taken for each referenced tweet.
pub trait Resharer {
    /// Reshares (retweets) the given tweet.
    fn reshare(&self, tweet: &TweetId) -> impl Future<Output = Result<(), TwitterApiError>> + Send;
}
