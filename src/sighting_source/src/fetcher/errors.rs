use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching the source page.
///
/// All of them are fatal for the current ingest run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed (bad header value, TLS init).
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {after:?}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout.
        after: Duration,
    },

    /// Connection, TLS, redirect or body-read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}
