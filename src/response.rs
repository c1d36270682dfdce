//! Search response decoding.
//!
//! Reads the XML body returned by the search endpoints into a
//! [`SearchResponse`]: global counters, result items and facets.

use crate::error::{DnzError, Result};
use crate::facet::{Facet, FacetSet};
use crate::pagination::Pagination;
use crate::xml::Element;
use serde::Serialize;
use std::collections::BTreeMap;

/// Default number of results requested per page.
pub const DEFAULT_NUM_RESULTS: u32 = 20;

/// A parsed response body.
#[derive(Debug, Clone)]
pub struct ResponseDocument {
    root: Element,
}

impl ResponseDocument {
    pub fn parse(body: &str) -> Result<Self> {
        Ok(Self {
            root: Element::parse(body)?,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Read an integer child of the root element.
    ///
    /// Returns `None` when the node is absent, or empty and untyped. A node
    /// declared `type="integer"` must hold an integer.
    pub fn root_integer(&self, tag: &str) -> Result<Option<u64>> {
        let Some(node) = self.root.child(tag) else {
            return Ok(None);
        };

        let text = node.text();
        let text = text.trim();
        let typed = node.attribute("type") == Some("integer");
        if text.is_empty() && !typed {
            return Ok(None);
        }

        text.parse::<u64>().map(Some).map_err(|_| {
            DnzError::MalformedResponse(format!("<{}> is not a non-negative integer: {:?}", tag, text))
        })
    }

    /// All `<result>` items in document order.
    pub fn results(&self) -> Vec<Item> {
        self.root
            .select("results/result")
            .into_iter()
            .map(Item::from_element)
            .collect()
    }

    /// All `<facet>` elements, decoded.
    pub fn facets(&self) -> FacetSet {
        self.root
            .select("facets/facet")
            .into_iter()
            .map(Facet::from_element)
            .collect()
    }
}

/// One search result: a flat map of normalized tag name to text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Item {
    attributes: BTreeMap<String, String>,
}

impl Item {
    /// Decode a `<result>` element; each child element becomes one attribute.
    pub fn from_element(element: &Element) -> Self {
        let attributes = element
            .children()
            .map(|child| (normalize_key(child.name()), child.text()))
            .collect();
        Self { attributes }
    }

    /// Attribute by normalized name (`display-url` → `display_url`).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.get("description")
    }

    pub fn category(&self) -> Option<&str> {
        self.get("category")
    }

    pub fn content_provider(&self) -> Option<&str> {
        self.get("content_provider")
    }

    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    pub fn display_url(&self) -> Option<&str> {
        self.get("display_url")
    }

    pub fn source_url(&self) -> Option<&str> {
        self.get("source_url")
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.get("thumbnail_url")
    }

    pub fn metadata_url(&self) -> Option<&str> {
        self.get("metadata_url")
    }
}

/// Lower-case a tag name and turn dashes into underscores.
fn normalize_key(tag: &str) -> String {
    tag.to_lowercase().replace('-', "_")
}

/// A decoded search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    /// Total matching results (may be larger than `results.len()`).
    pub result_count: u64,
    /// Page size the server applied.
    pub num_results_requested: u32,
    /// Offset of the first result.
    pub start: u64,
    pub results: Vec<Item>,
    pub facets: FacetSet,
}

impl SearchResponse {
    /// Decode a response body.
    ///
    /// `requested` is used when the body has no `num-results-requested`.
    pub fn parse(body: &str, requested: u32) -> Result<Self> {
        let doc = ResponseDocument::parse(body)?;

        let num_results_requested = match doc.root_integer("num-results-requested")? {
            Some(n) => u32::try_from(n).map_err(|_| {
                DnzError::MalformedResponse(format!("num-results-requested out of range: {}", n))
            })?,
            None => requested,
        };

        let response = Self {
            result_count: doc.root_integer("result-count")?.unwrap_or(0),
            num_results_requested,
            start: doc.root_integer("start")?.unwrap_or(0),
            results: doc.results(),
            facets: doc.facets(),
        };

        tracing::debug!(
            result_count = response.result_count,
            results = response.results.len(),
            facets = response.facets.len(),
            "decoded search response"
        );
        Ok(response)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::calculate(self.start, self.num_results_requested, self.result_count)
    }

    pub fn page(&self) -> u64 {
        self.pagination().page
    }

    pub fn pages(&self) -> u64 {
        self.pagination().pages
    }

    pub fn per_page(&self) -> u64 {
        self.pagination().per_page
    }
}
