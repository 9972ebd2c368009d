//! Parser for tweet links in direct message entities.
//!
//! This module provides a pure parser that finds the first link of the shape
//! `https://<domain>/<user>/status/<digits>` and returns the digits.

use crate::types::{TweetId, UrlEntity};

/// The domain tweet links are matched against by default.
pub const DEFAULT_DOMAIN: &str = "twitter.com";

/// Returns the tweet ID from the first matching link, if any.
///
/// Links are checked in order and the rest are ignored once one matches.
///
/// ```
/// use dm_reshare::extract::{DEFAULT_DOMAIN, tweet_id_from_links};
/// use dm_reshare::types::UrlEntity;
///
/// let links = vec![
///     UrlEntity::new("https://example.com/alice/status/1"),
///     UrlEntity::new("https://twitter.com/alice/status/12345"),
///     UrlEntity::new("https://twitter.com/bob/status/67890"),
/// ];
/// let id = tweet_id_from_links(&links, DEFAULT_DOMAIN).unwrap();
/// assert_eq!(id.as_str(), "12345");
/// ```
pub fn tweet_id_from_links(links: &[UrlEntity], domain: &str) -> Option<TweetId> {
    links
        .iter()
        .find_map(|link| tweet_id_from_url(&link.expanded_url, domain))
}

/// Parses a single expanded URL.
///
/// # Parsing Rules
///
/// - The URL must start with `https://{domain}/`
/// - The next path segment (the user) must be non-empty and contain no `/`
/// - It must be followed by `/status/` and at least one digit
/// - The whole digit run is taken; whatever follows must start with a
///   non-digit and is ignored
///
/// ```
/// use dm_reshare::extract::tweet_id_from_url;
///
/// let id = |u| tweet_id_from_url(u, "twitter.com").map(|t| t.as_str().to_string());
/// assert_eq!(id("https://twitter.com/alice/status/12345"), Some("12345".into()));
/// assert_eq!(id("https://twitter.com/alice/status/12345?s=20"), Some("12345".into()));
/// assert_eq!(id("https://twitter.com/alice/likes"), None);
/// assert_eq!(id("http://twitter.com/alice/status/12345"), None);
/// ```
pub fn tweet_id_from_url(url: &str, domain: &str) -> Option<TweetId> {
    let path = url
        .strip_prefix("https://")?
        .strip_prefix(domain)?
        .strip_prefix('/')?;

    let (user, rest) = path.split_once('/')?;
    if user.is_empty() {
        return None;
    }

    let tail = rest.strip_prefix("status/")?;
    let digits_end = tail
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tail.len());

    // TweetId::parse rejects an empty digit run.
    TweetId::parse(&tail[..digits_end]).ok()
}
