//! Error types for the record fetcher.

use thiserror::Error;

/// Errors raised while talking to the backend API.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (connect, timeout, broken body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API error ({status}) for {url}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Body was not the JSON shape we expected
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for the record fetcher
pub type Result<T> = std::result::Result<T, Error>;
