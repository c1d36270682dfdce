//! Per-version argument tables and URL path templates for the DigitalNZ API.

use crate::error::{DnzError, Result};
use std::fmt;
use std::str::FromStr;

/// API endpoints known to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    CustomSearch,
    CustomSearchPreview,
    Record,
}

impl Endpoint {
    /// Path template, relative to the base URL, with `${name}` placeholders.
    pub fn path_template(&self) -> &'static str {
        match self {
            Self::Search => "records/${version}.xml/",
            Self::CustomSearch => "custom_searches/${version}/${custom_search}.xml",
            Self::CustomSearchPreview => "custom_searches/${version}/test.xml",
            Self::Record => "records/${version}/${id}.xml",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::CustomSearch => "custom_search",
            Self::CustomSearchPreview => "custom_search_preview",
            Self::Record => "record",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported API versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    /// Legal option keys for `endpoint` under this version.
    ///
    /// `None` means the version declares no table for the endpoint, in which
    /// case options are passed through unchecked.
    pub fn legal_keys(&self, endpoint: Endpoint) -> Option<&'static [&'static str]> {
        match (self, endpoint) {
            (_, Endpoint::Search) => Some(SEARCH_ARGS),
            (Self::V1, Endpoint::CustomSearch) => Some(V1_CUSTOM_SEARCH_ARGS),
            (Self::V2, Endpoint::CustomSearch) => Some(V2_CUSTOM_SEARCH_ARGS),
            (Self::V2, Endpoint::CustomSearchPreview) => Some(V2_CUSTOM_SEARCH_PREVIEW_ARGS),
            _ => None,
        }
    }
}

impl FromStr for ApiVersion {
    type Err = DnzError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            other => Err(DnzError::UnknownVersion(other.to_string())),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SEARCH_ARGS: &[&str] = &[
    "search_text",
    "api_key",
    "num_results",
    "start",
    "sort",
    "direction",
    "facets",
    "facet_num_results",
    "facet_start",
];

const V1_CUSTOM_SEARCH_ARGS: &[&str] = &[
    "custom_search",
    "search_text",
    "api_key",
    "num_results",
    "start",
    "sort",
    "direction",
];

const V2_CUSTOM_SEARCH_ARGS: &[&str] = &[
    "custom_search",
    "search_text",
    "api_key",
    "num_results",
    "start",
    "sort",
    "direction",
    "facets",
    "facet_num_results",
    "facet_start",
];

const V2_CUSTOM_SEARCH_PREVIEW_ARGS: &[&str] = &["api_key"];

/// Facets the search endpoint can be asked to return.
pub const FACETS: &[&str] = &[
    "category",
    "content_partner",
    "creator",
    "language",
    "rights",
    "century",
    "decade",
    "year",
];
