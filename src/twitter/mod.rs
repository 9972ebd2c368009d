//! Twitter API client and capability traits.
//!
//! The poll cycle depends only on [`InboxFeed`] and [`Resharer`].
//! [`TwitterClient`] implements both over HTTP.
//!
//! Key features:
//! - Distinguishes throttling from transient and permanent errors
//! - Doubling backoff for transient retweet failures

mod api;
mod client;
mod error;
mod retry;
mod wire;

pub use api::{InboxFeed, Resharer};
pub use client::{DEFAULT_API_BASE, TwitterClient};
pub use error::{RATE_LIMIT_ERROR_CODE, TwitterApiError, TwitterErrorKind};
pub use retry::{RetryConfig, retry_transient};
