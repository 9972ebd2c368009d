//! Walking the inbox feed back to the watermark.
//!
//! The feed is newest-first and paginated. The walk requests pages until it
//! sees an event at or before the watermark, or until the feed runs out, and
//! keeps only allow-listed `message_create` events.
//!
//! # Throttling
//!
//! A throttled page request is not an error: the walk sleeps for the
//! configured cooldown and reissues the identical request. The cursor never
//! advances past a page that has not been received, so throttling only delays
//! the result.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::allowlist::Allowlist;
use crate::twitter::{InboxFeed, TwitterApiError};
use crate::types::{Cursor, EventId, EventPage, InboxEvent};

/// Events collected by a feed walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedWalk {
    /// Allow-listed `message_create` events newer than the watermark, newest first.
    pub events: Vec<InboxEvent>,

    /// Pages successfully received.
    pub pages_fetched: usize,

    /// Times a throttled request was slept on and retried.
    pub throttle_waits: u32,
}

/// Walks the feed from the newest page down to `watermark`.
///
/// # Errors
///
/// Returns the first non-throttle error from the feed. Nothing collected
/// before the error is returned.
pub async fn walk_feed<F: InboxFeed>(
    feed: &F,
    watermark: &EventId,
    allowlist: &Allowlist,
    page_size: u32,
    throttle_cooldown: Duration,
) -> Result<FeedWalk, TwitterApiError> {
    let mut walk = FeedWalk::default();
    let mut cursor = Cursor::start();

    'pages: loop {
        let page = fetch_page_throttled(
            feed,
            &cursor,
            page_size,
            throttle_cooldown,
            &mut walk.throttle_waits,
        )
        .await?;
        walk.pages_fetched += 1;
        debug!(events = page.events.len(), cursor = %cursor, "Got inbox page");

        for event in page.events {
            if event.id.is_at_or_before(watermark) {
                debug!(id = %event.id, "Reached already processed history");
                break 'pages;
            }
            trace!(id = %event.id, sender = %event.sender, kind = %event.kind, "Inbox event");
            if event.kind.is_actionable() && allowlist.contains(&event.sender) {
                walk.events.push(event);
            }
        }

        if page.next_cursor.is_end() {
            break;
        }
        cursor = page.next_cursor;
    }

    Ok(walk)
}

/// Fetches one page, sleeping `cooldown` and retrying the same request for as
/// long as the feed reports throttling.
async fn fetch_page_throttled<F: InboxFeed>(
    feed: &F,
    cursor: &Cursor,
    page_size: u32,
    cooldown: Duration,
    throttle_waits: &mut u32,
) -> Result<EventPage, TwitterApiError> {
    loop {
        match feed.fetch_page(cursor, page_size).await {
            Ok(page) => return Ok(page),
            Err(e) if e.is_throttled() => {
                *throttle_waits += 1;
                warn!(error = %e, ?cooldown, cursor = %cursor, "Throttled, sleeping before retrying the same page");
                tokio::time::sleep(cooldown).await;
            }
            Err(e) => return Err(e),
        }
    }
}
