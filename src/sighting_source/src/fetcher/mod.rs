//! Page fetching abstraction.
//!
//! [`PageFetcher`] is the seam between the ingest orchestrator and the network.
//! Production code uses [`http::HttpFetcher`]; tests swap in a stub that returns
//! a fixture [`Document`].
//!
//! # Example
//!
//! ```rust
//! # use async_trait::async_trait;
//! # use sighting_source::{Document, FetchError, PageFetcher};
//! struct Fixture(&'static str);
//!
//! #[async_trait]
//! impl PageFetcher for Fixture {
//!     async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
//!         Ok(Document::from_html(url, self.0))
//!     }
//! }
//! ```
pub mod errors;
pub mod headers;
pub mod http;

use async_trait::async_trait;

use crate::{document::Document, fetcher::errors::FetchError};

/// Retrieves the remote page. Implementations must not retry.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its body.
    async fn fetch(&self, url: &str) -> Result<Document, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticPage;
    struct Offline;

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
            Ok(Document::from_html(url, "<html><body></body></html>"))
        }
    }

    #[async_trait]
    impl PageFetcher for Offline {
        async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    fn pick(online: bool) -> Box<dyn PageFetcher> {
        if online { Box::new(StaticPage) } else { Box::new(Offline) }
    }

    #[tokio::test]
    async fn fetchers_are_usable_as_trait_objects() {
        let doc = pick(true).fetch("https://example.test/page").await.unwrap();
        assert_eq!(doc.url, "https://example.test/page");
        assert_eq!(doc.final_url, doc.url);

        let err = pick(false).fetch("https://example.test/page").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }
}
