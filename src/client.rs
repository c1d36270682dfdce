//! The DigitalNZ API client.

use crate::error::{DnzError, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::request::{Options, RequestBuilder};
use crate::schema::Endpoint;
use std::sync::Arc;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "http://api.digitalnz.org";

/// Default API version.
pub const DEFAULT_VERSION: &str = "v1";

/// Client for the DigitalNZ API.
///
/// Holds the API key, version and base URL, and the [`Fetch`] collaborator
/// used for every request. Cloning is cheap; clones share the fetcher.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> dnz_client::error::Result<()> {
/// use dnz_client::{DnzClient, SearchOptions};
///
/// let client = DnzClient::from_env()?;
/// let search = client.search("rugby", SearchOptions::new().num_results(50)).await?;
/// for (i, item) in search.results().iter().enumerate() {
///     println!("{}: {}", i + 1, item.title().unwrap_or("-"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DnzClient {
    pub(crate) fetcher: Arc<dyn Fetch>,
    pub(crate) api_key: String,
    pub(crate) version: String,
    pub(crate) base_url: String,
}

impl DnzClient {
    /// Create a client with the given API key and the HTTP fetcher.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_fetcher(api_key, HttpFetcher::new()?))
    }

    /// Create a client that sends requests through `fetcher`.
    pub fn with_fetcher(api_key: impl Into<String>, fetcher: impl Fetch + 'static) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            api_key: api_key.into(),
            version: DEFAULT_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a client from `DNZ_API_KEY`, with optional `DNZ_API_VERSION`
    /// and `DNZ_BASE_URL` overrides.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("DNZ_API_KEY")
            .map_err(|_| DnzError::Config("set DNZ_API_KEY or pass an API key".to_string()))?;
        if api_key.is_empty() {
            return Err(DnzError::Config("DNZ_API_KEY is empty".to_string()));
        }

        let mut client = Self::new(api_key)?;
        if let Ok(version) = std::env::var("DNZ_API_VERSION") {
            client = client.with_version(version);
        }
        if let Ok(url) = std::env::var("DNZ_BASE_URL") {
            client = client.with_base_url(url);
        }
        Ok(client)
    }

    /// Override the API version. Unknown versions fail when a request is built.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Override the base URL (useful for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(&self.base_url, &self.api_key, &self.version)
    }

    /// Validate `options`, build the URL for `endpoint` and fetch it.
    pub async fn fetch(&self, endpoint: Endpoint, options: Options) -> Result<String> {
        let url = self.request_builder().build(endpoint, options)?;
        self.get(&url).await
    }

    /// Like [`DnzClient::fetch`] but without option validation.
    pub async fn fetch_unchecked(&self, endpoint: Endpoint, options: Options) -> Result<String> {
        let url = self.request_builder().build_unchecked(endpoint, options)?;
        self.get(&url).await
    }

    async fn get(&self, url: &str) -> Result<String> {
        tracing::debug!(url = %self.redact(url), "fetching");

        match self.fetcher.fetch(url).await {
            Err(DnzError::Api { status: 401, .. }) => {
                tracing::warn!(api_key = %mask_key(&self.api_key), "API key rejected");
                Err(DnzError::InvalidApiKey {
                    api_key: self.api_key.clone(),
                })
            }
            other => other,
        }
    }

    fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            return url.to_string();
        }
        let encoded = urlencoding::encode(&self.api_key);
        url.replace(encoded.as_ref(), &mask_key(&self.api_key))
    }
}

/// Mask a key for display: show first 4 and last 4 chars.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
