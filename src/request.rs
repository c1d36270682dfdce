//! Request URL construction.
//!
//! Validates option maps against the per-version argument schema, resolves
//! `${name}` placeholders in endpoint path templates, and percent-encodes the
//! remaining options as a query string. Nothing here performs I/O.
//!
//! # Example
//!
//! ```
//! use dnz_client::request::{Options, RequestBuilder};
//! use dnz_client::schema::Endpoint;
//!
//! let mut options = Options::new();
//! options.insert("search_text", "*:*");
//!
//! let url = RequestBuilder::new("http://api.digitalnz.org/", "abc", "v1")
//!     .build(Endpoint::Search, options)
//!     .unwrap();
//! assert_eq!(
//!     url,
//!     "http://api.digitalnz.org/records/v1.xml/?api_key=abc&search_text=%2A%3A%2A"
//! );
//! ```

use crate::error::{DnzError, Result};
use crate::schema::{ApiVersion, Endpoint};
use serde::Serialize;
use std::collections::BTreeMap;

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Text(String),
    Int(i64),
    List(Vec<String>),
}

impl OptionValue {
    /// Wire representation; lists are comma-joined.
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Int(n) => n.to_string(),
            Self::List(items) => items.join(","),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for OptionValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u64> for OptionValue {
    fn from(n: u64) -> Self {
        Self::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[&str]> for OptionValue {
    fn from(items: &[&str]) -> Self {
        Self::List(items.iter().map(|s| s.to_string()).collect())
    }
}

/// Wire options keyed by their API name, kept in sorted key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, OptionValue>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an option.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert only when the key is absent.
    pub fn insert_default(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.0
            .entry(key.to_string())
            .or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Percent-encode as `key=value` pairs joined by `&`.
    pub fn to_query(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    urlencoding::encode(k),
                    urlencoding::encode(&v.to_query_value())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Builds request URLs for one API key, version and base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    api_key: String,
    version: String,
}

impl RequestBuilder {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            version: version.into(),
        }
    }

    /// Validate `options` for `endpoint` and build the full URL.
    pub fn build(&self, endpoint: Endpoint, options: Options) -> Result<String> {
        let version: ApiVersion = self.version.parse()?;
        validate_options(version, endpoint, &options)?;
        self.create_url(endpoint, options)
    }

    /// Build the URL without checking option keys against the schema.
    ///
    /// The version must still be known.
    pub fn build_unchecked(&self, endpoint: Endpoint, options: Options) -> Result<String> {
        let _: ApiVersion = self.version.parse()?;
        self.create_url(endpoint, options)
    }

    fn create_url(&self, endpoint: Endpoint, mut options: Options) -> Result<String> {
        options.insert_default("api_key", self.api_key.as_str());
        options.insert_default("version", self.version.as_str());

        let path = resolve_template(endpoint.path_template(), &mut options)?;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        if options.is_empty() {
            Ok(url)
        } else {
            Ok(format!("{}?{}", url, options.to_query()))
        }
    }
}

/// Check every option key against the endpoint's legal set for `version`.
pub fn validate_options(version: ApiVersion, endpoint: Endpoint, options: &Options) -> Result<()> {
    let Some(legal) = version.legal_keys(endpoint) else {
        return Ok(());
    };

    let invalid: Vec<String> = options
        .keys()
        .filter(|k| !legal.contains(k))
        .map(String::from)
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(DnzError::InvalidOption {
            endpoint: endpoint.to_string(),
            provided: invalid,
            valid: legal.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Substitute each `${name}` token in `template`, consuming the matching
/// option. Values are percent-encoded as single path segments and may not
/// themselves introduce new tokens.
pub fn resolve_template(template: &str, options: &mut Options) -> Result<String> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("${") {
        let Some(close) = rest[open + 2..].find('}') else {
            break;
        };
        let name = &rest[open + 2..open + 2 + close];
        let value = options
            .remove(name)
            .ok_or_else(|| DnzError::MissingArgument(name.to_string()))?;

        path.push_str(&rest[..open]);
        path.push_str(&urlencoding::encode(&value.to_query_value()));
        rest = &rest[open + 2 + close + 1..];
    }

    path.push_str(rest);
    Ok(path)
}
