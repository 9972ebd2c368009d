//! DM Reshare Bot - polls a Twitter DM inbox and retweets links sent by allow-listed accounts.
//!
//! This library provides the polling core: the ID order, link extraction, the
//! watermark store, the allow-list and Twitter adapters, and the poll loop.

pub mod allowlist;
pub mod config;
pub mod extract;
pub mod persistence;
pub mod twitter;
pub mod types;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_utils;
