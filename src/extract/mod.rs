//! Extraction of tweet references from direct messages.

mod parser;

pub use parser::{DEFAULT_DOMAIN, tweet_id_from_links, tweet_id_from_url};
