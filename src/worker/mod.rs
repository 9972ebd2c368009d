//! The polling worker.
//!
//! A poll cycle fetches the allow-list, loads the watermark, walks the inbox
//! feed back to it and reshares every linked tweet it finds, saving the
//! watermark after each message. The scheduler runs cycles on a fixed period
//! until shut down.
//!
//! # Module Structure
//!
//! - [`walk`]: Paging through the feed with in-place throttle retries
//! - [`cycle`]: One full poll cycle
//! - [`scheduler`]: The periodic loop
//! - [`shutdown`]: Ctrl-C and SIGTERM handling
//! - [`poll`]: Polling configuration

mod cycle;
mod poll;
mod scheduler;
mod shutdown;
mod walk;


pub use cycle::{CycleError, CycleReport, PollCycle};
pub use poll::PollConfig;
pub use scheduler::{SchedulerStats, run_scheduler};
pub use shutdown::cancel_on_signal;
pub use walk::{FeedWalk, walk_feed};
