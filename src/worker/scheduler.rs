//! The poll loop.
//!
//! Runs a cycle immediately, then once per poll interval, until the shutdown
//! token is cancelled. Cycles never overlap: the next tick is only awaited
//! after the current cycle finishes. Cancellation is observed between cycles;
//! a cycle in flight runs to completion.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::allowlist::AllowlistSource;
use crate::persistence::WatermarkStore;
use crate::twitter::{InboxFeed, Resharer};

use super::cycle::PollCycle;

/// Shortest period the loop will tick at.
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Counts of cycles run by [`run_scheduler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles_run: usize,
    pub cycles_failed: usize,
}

/// Runs poll cycles every `period` until `shutdown` is cancelled.
///
/// Cycle failures are logged and the loop waits for the next tick. A period
/// shorter than one second is raised to one second.
#[instrument(skip_all, fields(period = ?period))]
pub async fn run_scheduler<A, S, C>(
    cycle: &PollCycle<A, S, C>,
    period: Duration,
    shutdown: CancellationToken,
) -> SchedulerStats
where
    A: AllowlistSource,
    S: WatermarkStore,
    C: InboxFeed + Resharer,
{
    info!("Poll loop started");
    let mut stats = SchedulerStats::default();

    // A zero period would make `interval` panic.
    let period = period.max(MIN_PERIOD);

    // The first tick completes immediately.
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("Shutdown signal received, stopping poll loop");
                break;
            }

            _ = ticker.tick() => {
                stats.cycles_run += 1;
                match cycle.run_once().await {
                    Ok(report) => info!(
                        processed = report.events_processed,
                        reshared = report.reshares_succeeded(),
                        reshare_failures = report.reshare_failures,
                        watermark = %report.watermark,
                        "Poll cycle complete"
                    ),
                    Err(e) => {
                        stats.cycles_failed += 1;
                        error!(error = %e, "Failed to poll DMs");
                    }
                }
            }
        }
    }

    info!(cycles = stats.cycles_run, "Poll loop stopped");
    stats
}
