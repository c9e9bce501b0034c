//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building one pooled HTTP client per run
//! - GET requests returning the decoded page body
//! - Error classification into typed fetch failures
//!
//! Failures are returned, never raised past the caller; the scheduler decides
//! what a failure means for the crawl. There is no retry.

use crate::config::HttpConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it
    pub final_url: Url,

    /// Decoded page body
    pub body: String,
}

/// Why a single fetch failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Connection refused, DNS failure, TLS failure, redirect loop...
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request or body read exceeded the configured timeout
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    /// The body could not be read or decoded as text
    #[error("Failed to decode body of {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Decode { url, .. } => url,
        }
    }
}

/// Source of page bodies for the scheduler
///
/// `HttpFetcher` is the production implementation; tests substitute stubs.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Performs one GET for `url`
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Fetcher backed by a shared, pooled `reqwest::Client`
///
/// The client is only read during a run, so concurrent fetches share its
/// connection pool; it is dropped once when the run ends.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use trawl::config::HttpConfig;
/// use trawl::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies any failure
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with readable body | `Ok(FetchedPage)` |
/// | Any other status | `FetchError::Status` |
/// | Timeout (connect, request, or body) | `FetchError::Timeout` |
/// | Body not decodable | `FetchError::Decode` |
/// | Anything else | `FetchError::Network` |
pub async fn fetch_url(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_request_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    Ok(FetchedPage { final_url, body })
}

fn classify_request_error(url: &Url, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
