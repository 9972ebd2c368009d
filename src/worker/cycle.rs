//! A single poll cycle.
//!
//! # Cycle Flow
//!
//! 1. Fetch the allow-list (abort on error)
//! 2. Load the watermark (abort on error; a missing record is the empty watermark)
//! 3. Walk the inbox feed down to the watermark (abort on error; throttling is
//!    handled inside the walk)
//! 4. Sort the collected events ascending by ID
//! 5. For each event: extract a tweet link, reshare it if found, then advance
//!    the watermark to the event's ID and save it
//!
//! # Critical Invariant
//!
//! The watermark advances after every event whether or not the reshare
//! succeeded. A reshare is attempted at most once per event; a permanently
//! failing reshare is never retried on later cycles. A failed save is logged
//! and does not stop the cycle: the worst case after a crash is one event
//! processed twice.

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::allowlist::{Allowlist, AllowlistError, AllowlistSource};
use crate::extract::tweet_id_from_links;
use crate::persistence::{WatermarkError, WatermarkStore};
use crate::twitter::{InboxFeed, Resharer, TwitterApiError};
use crate::types::EventId;

use super::poll::PollConfig;
use super::walk::walk_feed;

/// Errors that abort a poll cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The allow-list could not be fetched.
    #[error("fetching allow-list: {0}")]
    Allowlist(#[from] AllowlistError),

    /// The stored watermark could not be read.
    #[error("reading stored watermark: {0}")]
    LoadWatermark(#[from] WatermarkError),

    /// The inbox feed failed with something other than throttling.
    #[error("failed to fetch DMs: {0}")]
    Feed(#[from] TwitterApiError),
}

/// Result type for poll cycles.
pub type Result<T> = std::result::Result<T, CycleError>;

/// What a completed cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The watermark after the cycle.
    pub watermark: EventId,

    /// Events processed (allow-listed messages newer than the old watermark).
    pub events_processed: usize,

    /// Events that contained a tweet link.
    pub reshares_attempted: usize,

    /// Reshares that failed.
    pub reshare_failures: usize,

    /// Watermark saves that failed.
    pub save_failures: usize,

    /// Throttled feed requests that were waited out.
    pub throttle_waits: u32,
}

impl CycleReport {
    pub fn reshares_succeeded(&self) -> usize {
        self.reshares_attempted - self.reshare_failures
    }
}

/// One poll cycle's collaborators and settings.
///
/// Holds no state between cycles: the watermark is loaded from the store at
/// the start of every cycle and returned in the [`CycleReport`].
pub struct PollCycle<A, S, C> {
    allowlist: A,
    store: S,
    client: C,
    config: PollConfig,
}

impl<A, S, C> PollCycle<A, S, C>
where
    A: AllowlistSource,
    S: WatermarkStore,
    C: InboxFeed + Resharer,
{
    pub fn new(allowlist: A, store: S, client: C, config: PollConfig) -> Self {
        PollCycle {
            allowlist,
            store,
            client,
            config,
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn allowlist_source(&self) -> &A {
        &self.allowlist
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Runs one cycle to completion.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<CycleReport> {
        info!("Polling DMs");

        let allowlist = self.allowlist.fetch().await?;
        info!(count = allowlist.len(), "Fetched allow-list");

        let watermark = self.store.load().await?;
        info!(last_processed = %watermark, "Loaded watermark");

        self.advance_from(&allowlist, watermark).await
    }

    /// Walks the feed from `watermark` and processes everything newer,
    /// returning the advanced watermark in the report.
    async fn advance_from(
        &self,
        allowlist: &Allowlist,
        mut watermark: EventId,
    ) -> Result<CycleReport> {
        let walk = walk_feed(
            &self.client,
            &watermark,
            allowlist,
            self.config.page_size,
            self.config.throttle_cooldown,
        )
        .await?;
        debug!(
            events = walk.events.len(),
            pages = walk.pages_fetched,
            "DMs fetched"
        );

        let mut events = walk.events;
        events.sort_by(|a, b| a.id.cmp(&b.id));

        let mut report = CycleReport {
            throttle_waits: walk.throttle_waits,
            ..CycleReport::default()
        };

        for event in events {
            info!(
                id = %event.id,
                sender = %event.sender,
                label = allowlist.label(&event.sender).unwrap_or_default(),
                text = ?event.text,
                "Processing message"
            );

            match tweet_id_from_links(&event.links, &self.config.link_domain) {
                Some(tweet) => {
                    report.reshares_attempted += 1;
                    info!(tweet = %tweet, "Retweeting");
                    if let Err(e) = self.client.reshare(&tweet).await {
                        report.reshare_failures += 1;
                        warn!(tweet = %tweet, error = %e, "Failed to retweet");
                    }
                }
                None => debug!(id = %event.id, "No tweet link in message"),
            }

            if event.id > watermark {
                watermark = event.id;
            }
            report.events_processed += 1;
            if let Err(e) = self.store.save(&watermark).await {
                report.save_failures += 1;
                error!(watermark = %watermark, error = %e, "Failed to save watermark");
            }
        }

        report.watermark = watermark;
        Ok(report)
    }
}
