//! HTTP transport.
//!
//! The client never talks to the network directly; it hands fully-built URLs
//! to a [`Fetch`] implementation. [`HttpFetcher`] is the `reqwest`-backed
//! default, tests substitute in-memory fakes.

use crate::error::{DnzError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Retrieves a response body for a URL.
///
/// Implementations must return [`DnzError::Api`] for non-success statuses so
/// the client can recognise rejected API keys.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Fetch`] over a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a 30 second timeout.
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("dnz-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        handle_response(response).await
    }
}

/// Map non-success statuses to [`DnzError::Api`].
async fn handle_response(response: reqwest::Response) -> Result<String> {
    let status = response.status().as_u16();

    match status {
        200..=299 => Ok(response.text().await?),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(DnzError::Api {
                status,
                message: body,
            })
        }
    }
}
