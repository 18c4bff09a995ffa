//! Error types for the javtube scraper
//!
//! Most upstream failures are absorbed by the scraper and logged; the
//! variants here are what escapes to callers, plus the internal
//! conditions the cascade logs before degrading.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all javtube scraper operations
///
/// Implements Display for human-readable messages and Serialize
/// so the facade can hand errors straight to JSON.
#[derive(Error, Debug)]
pub enum JavtubeError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Caller omitted or emptied a required argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// Upstream answered 2xx but the body broke its contract
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The requested item exists nowhere upstream in usable form
    #[error("Not found: {0}")]
    NotFound(String),
}

impl JavtubeError {
    /// True for errors caused by the caller rather than the upstream
    pub fn is_client_error(&self) -> bool {
        matches!(self, JavtubeError::InvalidInput(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, JavtubeError::NotFound(_))
    }
}

impl Serialize for JavtubeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for javtube operations
pub type Result<T> = std::result::Result<T, JavtubeError>;
