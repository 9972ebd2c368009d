//! Persistence layer for the DM reshare bot.
//!
//! The bot's only durable state is the watermark: the ID of the last inbox
//! event it has processed. It is loaded at the start of every poll cycle and
//! saved after every processed event, so a crash costs at most one
//! re-processed event.
//!
//! # File Layout
//!
//! ```text
//! <state_dir>/
//!   watermark.json    # current watermark record
//! ```

pub mod watermark;

pub use watermark::{
    FileWatermarkStore, PersistedWatermark, SCHEMA_VERSION, WATERMARK_FILE, WatermarkError,
    WatermarkStore, load_watermark, save_watermark_atomic, try_load_watermark,
};
