//! Twitter API error types.
//!
//! Errors are categorized so callers can react without inspecting messages:
//!
//! - **Throttled** errors mean "same request, later". The feed walker sleeps
//!   for a fixed cooldown and reissues the identical page request.
//! - **Transient** errors are retriable with backoff (5xx, network failures).
//! - **Permanent** errors are returned to the caller as-is (most 4xx,
//!   malformed responses, tweet IDs out of range).

use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Twitter's error code for "Rate limit exceeded".
pub const RATE_LIMIT_ERROR_CODE: u32 = 88;

/// The kind of Twitter API error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwitterErrorKind {
    /// The request was rate limited (HTTP 429 or error code 88).
    ///
    /// Retrying only helps after the rate limit window resets, which is far
    /// longer than a backoff delay.
    Throttled,

    /// Transient error - safe to retry with backoff.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - Connection failures and timeouts
    Transient,

    /// Permanent error - retrying the same request will not help.
    ///
    /// Examples:
    /// - HTTP 4xx other than rate limits (e.g. already retweeted, not found)
    /// - Authentication failures
    /// - Response bodies that fail to decode
    Permanent,
}

impl TwitterErrorKind {
    /// Returns true if this error is retriable with backoff.
    ///
    /// `Throttled` returns false: it needs a cooldown, not a quick retry.
    pub fn is_retriable(&self) -> bool {
        matches!(self, TwitterErrorKind::Transient)
    }
}

/// A Twitter API error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct TwitterApiError {
    /// The kind of error (throttled, transient, or permanent).
    pub kind: TwitterErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// The first Twitter error code in the response body, if any.
    pub api_code: Option<u32>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying transport error, if available.
    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for TwitterApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status_code, self.api_code) {
            (Some(status), Some(code)) => write!(
                f,
                "Twitter API error (HTTP {}, code {}): {}",
                status, code, self.message
            ),
            (Some(status), None) => {
                write!(f, "Twitter API error (HTTP {}): {}", status, self.message)
            }
            (None, _) => write!(f, "Twitter API error: {}", self.message),
        }
    }
}

/// Error payload returned by the v1.1 API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    code: u32,
    #[serde(default)]
    message: String,
}

impl TwitterApiError {
    fn without_source(kind: TwitterErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: None,
            api_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a throttle error without a transport source.
    pub fn throttled_without_source(message: impl Into<String>) -> Self {
        Self::without_source(TwitterErrorKind::Throttled, message)
    }

    /// Creates a transient error without a transport source.
    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self::without_source(TwitterErrorKind::Transient, message)
    }

    /// Creates a permanent error without a transport source.
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self::without_source(TwitterErrorKind::Permanent, message)
    }

    /// Returns true if this error is the rate-limit signal.
    pub fn is_throttled(&self) -> bool {
        self.kind == TwitterErrorKind::Throttled
    }

    /// Categorizes a transport-level failure.
    ///
    /// Timeouts and connection errors are transient; a body that fails to
    /// decode is permanent.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() || err.is_connect() || err.is_request() {
            TwitterErrorKind::Transient
        } else {
            TwitterErrorKind::Permanent
        };
        Self {
            kind,
            status_code: err.status().map(|s| s.as_u16()),
            api_code: None,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Categorizes a non-success HTTP response from its status and body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let first = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.errors.into_iter().next());
        let api_code = first.as_ref().map(|e| e.code);
        let message = match first {
            Some(entry) if !entry.message.is_empty() => entry.message,
            _ => truncate_for_error(body, 500),
        };

        let kind = if status == StatusCode::TOO_MANY_REQUESTS
            || api_code == Some(RATE_LIMIT_ERROR_CODE)
        {
            TwitterErrorKind::Throttled
        } else if status.is_server_error() {
            TwitterErrorKind::Transient
        } else {
            TwitterErrorKind::Permanent
        };

        Self {
            kind,
            status_code: Some(status.as_u16()),
            api_code,
            message,
            source: None,
        }
    }
}

fn truncate_for_error(body: &str, max_chars: usize) -> String {
    let mut out: String = body.chars().take(max_chars).collect();
    if body.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
