//! Sender allow-list.
//!
//! Only messages from allow-listed senders are acted on. The list maps a
//! sender's user ID to a human-readable label and is fetched in full at the
//! start of every poll cycle. A fetch either returns the complete list or
//! fails; a partial list is never used.

mod runtime_config;

use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

use crate::types::SenderId;

pub use runtime_config::{DEFAULT_CONFIG_NAME, LIST_PAGE_SIZE, RuntimeConfigAllowlist};

/// Errors that can occur while fetching the allow-list.
#[derive(Debug, Error)]
pub enum AllowlistError {
    /// Transport failure talking to the config service.
    #[error("allow-list request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The config service returned a non-success status.
    #[error("allow-list service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The client could not be configured.
    #[error("invalid allow-list client configuration: {0}")]
    InvalidConfig(String),
}

/// Permitted senders, keyed by user ID, with a label for each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    senders: HashMap<SenderId, String>,
}

impl Allowlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a sender.
    pub fn insert(&mut self, sender: SenderId, label: impl Into<String>) {
        self.senders.insert(sender, label.into());
    }

    pub fn contains(&self, sender: &SenderId) -> bool {
        self.senders.contains_key(sender)
    }

    /// Returns the label for a sender, if allow-listed.
    pub fn label(&self, sender: &SenderId) -> Option<&str> {
        self.senders.get(sender).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(SenderId, L)> for Allowlist {
    fn from_iter<I: IntoIterator<Item = (SenderId, L)>>(iter: I) -> Self {
        let mut list = Allowlist::new();
        for (sender, label) in iter {
            list.insert(sender, label);
        }
        list
    }
}

/// A source the allow-list can be fetched from.
pub trait AllowlistSource {
    /// Fetches the complete allow-list.
    fn fetch(&self) -> impl Future<Output = Result<Allowlist, AllowlistError>> + Send;
}
