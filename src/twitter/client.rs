//! `reqwest` client for the Twitter v1.1 API.
//!
//! Authenticates with a pre-issued user-context bearer token; obtaining that
//! token is outside this crate.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};

use crate::types::{Cursor, EventPage, TweetId};

use super::api::{InboxFeed, Resharer};
use super::error::TwitterApiError;
use super::retry::{RetryConfig, retry_transient};
use super::wire::EventsListResponse;

/// Base URL of the public Twitter API.
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// A Twitter API client for one authenticated account.
#[derive(Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    api_base: String,
    retry_config: RetryConfig,
}

impl TwitterClient {
    /// Creates a client against `api_base` with the given bearer token.
    pub fn new(api_base: impl Into<String>, token: &str) -> Result<Self, TwitterApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("dm-reshare"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|_| {
            TwitterApiError::permanent_without_source("bearer token is not a valid header value")
        })?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(TwitterApiError::from_reqwest)?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            retry_config: RetryConfig::DEFAULT,
        })
    }

    /// Creates a client against the public API.
    pub fn from_token(token: &str) -> Result<Self, TwitterApiError> {
        Self::new(DEFAULT_API_BASE, token)
    }

    /// Overrides the backoff used when retweeting.
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Lists one page of direct message events, newest first.
    pub async fn list_events(
        &self,
        cursor: &Cursor,
        count: u32,
    ) -> Result<EventPage, TwitterApiError> {
        let mut request = self
            .http
            .get(format!(
                "{}/1.1/direct_messages/events/list.json",
                self.api_base
            ))
            .query(&[("count", count.to_string())]);
        if !cursor.is_end() {
            request = request.query(&[("cursor", cursor.as_str())]);
        }

        let response = request.send().await.map_err(TwitterApiError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TwitterApiError::from_response(status, &body));
        }

        let body: EventsListResponse = response
            .json()
            .await
            .map_err(TwitterApiError::from_reqwest)?;
        Ok(body.into())
    }

    /// Retweets a tweet once, without retry.
    ///
    /// Tweet IDs that do not fit in a `u64` are rejected as permanent errors.
    pub async fn retweet(&self, tweet: &TweetId) -> Result<(), TwitterApiError> {
        let id = tweet.as_u64().ok_or_else(|| {
            TwitterApiError::permanent_without_source(format!(
                "tweet ID {} is out of range",
                tweet
            ))
        })?;

        let response = self
            .http
            .post(format!("{}/1.1/statuses/retweet/{}.json", self.api_base, id))
            .send()
            .await
            .map_err(TwitterApiError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TwitterApiError::from_response(status, &body));
        }
        Ok(())
    }
}

impl InboxFeed for TwitterClient {
    async fn fetch_page(
        &self,
        cursor: &Cursor,
        page_size: u32,
    ) -> Result<EventPage, TwitterApiError> {
        self.list_events(cursor, page_size).await
    }
}

impl Resharer for TwitterClient {
    async fn reshare(&self, tweet: &TweetId) -> Result<(), TwitterApiError> {
        retry_transient(self.retry_config, || self.retweet(tweet)).await
    }
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
