use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT, redirect};
use shared_utils::env::{ConfigError, get_optional_env_var, parse_env_var_or};
use tracing::debug;

use crate::{
    document::Document,
    fetcher::{PageFetcher, errors::FetchError, headers},
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REFERER: &str = "https://www.google.com/";
const MAX_REDIRECTS: usize = 10;

/// Knobs for [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Whole-request timeout (connect + headers + body).
    pub timeout: Duration,
    /// Value of the `Referer` header.
    pub referer: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            referer: DEFAULT_REFERER.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Reads `WHALE_FETCH_TIMEOUT_SECS` and `WHALE_FETCH_REFERER`, falling back to
    /// the defaults for unset values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secs = parse_env_var_or("WHALE_FETCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let referer =
            get_optional_env_var("WHALE_FETCH_REFERER").unwrap_or_else(|| DEFAULT_REFERER.to_string());
        Ok(Self {
            timeout: Duration::from_secs(secs),
            referer,
        })
    }
}

/// reqwest-backed [`PageFetcher`].
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher with a browser-like header set, redirect following and
    /// the configured timeout.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let default_headers = headers::default_headers(&config.referer)
            .map_err(|e| FetchError::Client(format!("invalid referer: {e}")))?;

        let client = Client::builder()
            .default_headers(default_headers)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let user_agent = headers::random_user_agent();
        debug!(url, user_agent, "fetching page");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|e| self.classify(url, e))?;
        debug!(url, final_url, bytes = html.len(), "page fetched");

        Ok(Document {
            url: url.to_string(),
            final_url,
            html,
        })
    }
}
