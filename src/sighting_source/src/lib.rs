//! Source side of the sighting pipeline: fetches the published whale-count page.
//!
//! The crate exposes one abstraction, [`fetcher::PageFetcher`], and one concrete
//! implementation, [`fetcher::http::HttpFetcher`]. Fetching never retries; a run
//! either gets a [`Document`] or a [`fetcher::errors::FetchError`] and the caller
//! (a scheduler) decides what happens next.

pub mod document;
pub mod fetcher;

pub use document::Document;
pub use fetcher::{PageFetcher, errors::FetchError, http::{FetcherConfig, HttpFetcher}};
