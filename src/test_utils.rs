//! In-memory fakes for the bot's external capabilities, plus event builders.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use proptest::prelude::*;

use crate::allowlist::{Allowlist, AllowlistError, AllowlistSource};
use crate::persistence::{WatermarkError, WatermarkStore};
use crate::twitter::{InboxFeed, Resharer, TwitterApiError};
use crate::types::{
    Cursor, EventId, EventKind, EventPage, InboxEvent, SenderId, TweetId, UrlEntity,
};

// ─── Event builders ───────────────────────────────────────────────────────────

/// A `message_create` event with an optional link.
pub fn dm(id: &str, sender: &str, link: Option<&str>) -> InboxEvent {
    InboxEvent {
        id: EventId::new(id),
        kind: EventKind::MessageCreate,
        sender: SenderId::new(sender),
        text: link.map(|l| format!("check this {}", l)).unwrap_or_default(),
        links: link.into_iter().map(UrlEntity::new).collect(),
    }
}

/// A `message_create` event linking to `https://twitter.com/user/status/<tweet>`.
pub fn dm_with_tweet(id: &str, sender: &str, tweet: &str) -> InboxEvent {
    dm(
        id,
        sender,
        Some(&format!("https://twitter.com/user/status/{}", tweet)),
    )
}

/// An event of a non-actionable kind.
pub fn other_event(id: &str, sender: &str, tag: &str) -> InboxEvent {
    InboxEvent {
        kind: EventKind::Other(tag.to_string()),
        ..dm_with_tweet(id, sender, "1")
    }
}

pub fn allowlist(senders: &[&str]) -> Allowlist {
    senders
        .iter()
        .map(|s| (SenderId::new(*s), format!("label-{}", s)))
        .collect()
}

pub fn arb_event_id() -> impl Strategy<Value = EventId> {
    "[1-9][0-9]{0,24}".prop_map(EventId)
}

// ─── Allow-list ───────────────────────────────────────────────────────────────

/// An allow-list source returning a fixed list, or failing.
pub struct StaticAllowlist {
    list: Option<Allowlist>,
    pub fetches: AtomicUsize,
}

impl StaticAllowlist {
    pub fn new(list: Allowlist) -> Self {
        StaticAllowlist {
            list: Some(list),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        StaticAllowlist {
            list: None,
            fetches: AtomicUsize::new(0),
        }
    }
}

impl AllowlistSource for StaticAllowlist {
    async fn fetch(&self) -> Result<Allowlist, AllowlistError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.list.clone().ok_or_else(|| AllowlistError::Status {
            status: 503,
            body: "config service unavailable".to_string(),
        })
    }
}

// ─── Watermark store ──────────────────────────────────────────────────────────

/// A watermark store held in memory that records every save.
#[derive(Default)]
pub struct MemoryWatermarkStore {
    value: Mutex<Option<EventId>>,
    saves: Mutex<Vec<EventId>>,
    fail_load: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(id: &str) -> Self {
        let store = Self::new();
        *store.value.lock().unwrap() = Some(EventId::new(id));
        store
    }

    pub fn fail_load(self) -> Self {
        self.fail_load.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The stored value; `None` if nothing was ever saved.
    pub fn stored(&self) -> Option<EventId> {
        self.value.lock().unwrap().clone()
    }

    /// Every successfully saved value, in order.
    pub fn saves(&self) -> Vec<EventId> {
        self.saves.lock().unwrap().clone()
    }
}

impl WatermarkStore for MemoryWatermarkStore {
    async fn load(&self) -> Result<EventId, WatermarkError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(WatermarkError::Backend("load failed".to_string()));
        }
        Ok(self.stored().unwrap_or_default())
    }

    async fn save(&self, watermark: &EventId) -> Result<(), WatermarkError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(WatermarkError::Backend("save failed".to_string()));
        }
        *self.value.lock().unwrap() = Some(watermark.clone());
        self.saves.lock().unwrap().push(watermark.clone());
        Ok(())
    }
}

// ─── Twitter ──────────────────────────────────────────────────────────────────

/// A fake inbox feed and resharer.
///
/// Pages are addressed by cursor: page 0 by the empty cursor, page `i` by
/// `"c{i}"`. The last page returns an empty next cursor.
#[derive(Default)]
pub struct FakeTwitter {
    pages: HashMap<Cursor, EventPage>,
    throttles: Mutex<HashMap<Cursor, u32>>,
    failing_cursors: HashSet<Cursor>,
    failing_tweets: HashSet<String>,
    fetches: Mutex<Vec<Cursor>>,
    reshares: Mutex<Vec<TweetId>>,
}

impl FakeTwitter {
    /// Builds a feed from pages of events, each page newest first.
    pub fn paged(pages: Vec<Vec<InboxEvent>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, events)| {
                let next_cursor = if i + 1 < count {
                    Self::cursor_for(i + 1)
                } else {
                    Cursor::start()
                };
                (
                    Self::cursor_for(i),
                    EventPage {
                        events,
                        next_cursor,
                    },
                )
            })
            .collect();
        FakeTwitter {
            pages,
            ..Default::default()
        }
    }

    /// Builds a single-page feed.
    pub fn single_page(events: Vec<InboxEvent>) -> Self {
        Self::paged(vec![events])
    }

    pub fn cursor_for(page: usize) -> Cursor {
        if page == 0 {
            Cursor::start()
        } else {
            Cursor::new(format!("c{}", page))
        }
    }

    /// Makes the next `times` requests for `page` fail with a throttle error.
    pub fn throttle_page(self, page: usize, times: u32) -> Self {
        self.throttles
            .lock()
            .unwrap()
            .insert(Self::cursor_for(page), times);
        self
    }

    /// Makes every request for `page` fail with a permanent error.
    pub fn fail_page(mut self, page: usize) -> Self {
        self.failing_cursors.insert(Self::cursor_for(page));
        self
    }

    /// Makes resharing `tweet` fail.
    pub fn fail_tweet(mut self, tweet: &str) -> Self {
        self.failing_tweets.insert(tweet.to_string());
        self
    }

    /// Cursors requested so far, in order (throttled requests included).
    pub fn fetches(&self) -> Vec<Cursor> {
        self.fetches.lock().unwrap().clone()
    }

    /// Tweets reshare was attempted for, in order.
    pub fn reshares(&self) -> Vec<String> {
        self.reshares
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }
}

impl InboxFeed for FakeTwitter {
    async fn fetch_page(
        &self,
        cursor: &Cursor,
        _page_size: u32,
    ) -> Result<EventPage, TwitterApiError> {
        self.fetches.lock().unwrap().push(cursor.clone());

        if let Some(remaining) = self.throttles.lock().unwrap().get_mut(cursor)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(TwitterApiError::throttled_without_source(
                "Rate limit exceeded",
            ));
        }
        if self.failing_cursors.contains(cursor) {
            return Err(TwitterApiError::permanent_without_source("page unavailable"));
        }
        Ok(self.pages.get(cursor).cloned().unwrap_or_default())
    }
}

impl Resharer for FakeTwitter {
    async fn reshare(&self, tweet: &TweetId) -> Result<(), TwitterApiError> {
        self.reshares.lock().unwrap().push(tweet.clone());
        if self.failing_tweets.contains(tweet.as_str()) {
            return Err(TwitterApiError::permanent_without_source(
                "You have already retweeted this Tweet.",
            ));
        }
        Ok(())
    }
}
