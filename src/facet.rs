//! Facet decoding and lookup.

use crate::client::DnzClient;
use crate::error::Result;
use crate::search::{Search, SearchOptions};
use crate::xml::Element;
use serde::Serialize;
use std::collections::HashMap;

/// Number of results for one distinct value of a facet field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetValue {
    pub name: String,
    pub count: u64,
}

impl FacetValue {
    /// Decode a `<value>` element. Returns `None` for blank names.
    fn from_element(element: &Element) -> Option<Self> {
        let name = element.child("name").map(Element::text).unwrap_or_default();
        if name.trim().is_empty() {
            return None;
        }
        let count = element
            .child("num-results")
            .and_then(|n| n.text().trim().parse().ok())
            .unwrap_or(0);
        Some(Self { name, count })
    }
}

impl std::fmt::Display for FacetValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A facet field with its values in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub name: String,
    values: Vec<FacetValue>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Facet {
    pub fn new(name: impl Into<String>, values: Vec<FacetValue>) -> Self {
        let mut index = HashMap::with_capacity(values.len());
        for (i, v) in values.iter().enumerate() {
            index.entry(v.name.clone()).or_insert(i);
        }
        Self {
            name: name.into(),
            values,
            index,
        }
    }

    /// Decode a `<facet>` element.
    pub fn from_element(element: &Element) -> Self {
        let name = element
            .child("facet-field")
            .map(Element::text)
            .unwrap_or_default();

        let mut values = Vec::new();
        if let Some(container) = element.child("values") {
            for value in container.children() {
                match FacetValue::from_element(value) {
                    Some(v) => values.push(v),
                    None => tracing::debug!(facet = %name, "dropping facet value with blank name"),
                }
            }
        }

        Self::new(name, values)
    }

    pub fn values(&self) -> &[FacetValue] {
        &self.values
    }

    /// Look up a value by name.
    pub fn get(&self, value: &str) -> Option<&FacetValue> {
        self.index.get(value).map(|&i| &self.values[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FacetValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Search text narrowed to one of this facet's values: `facet:value text`.
    pub fn refine(&self, value: &str, text: &str) -> String {
        format!("{}:{} {}", self.name, value, text)
    }

    /// Run `text` narrowed to one of this facet's values.
    pub async fn search(
        &self,
        client: &DnzClient,
        value: &str,
        text: &str,
        options: SearchOptions,
    ) -> Result<Search> {
        client.search(&self.refine(value, text), options).await
    }
}

impl<'a> IntoIterator for &'a Facet {
    type Item = &'a FacetValue;
    type IntoIter = std::slice::Iter<'a, FacetValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Facets of a response, iterable in document order and addressable by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FacetSet {
    facets: Vec<Facet>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FacetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a facet. Name lookup resolves to the first facet of a name.
    pub fn push(&mut self, facet: Facet) {
        self.index
            .entry(facet.name.clone())
            .or_insert(self.facets.len());
        self.facets.push(facet);
    }

    /// Look up a facet by field name.
    pub fn get(&self, name: &str) -> Option<&Facet> {
        self.index.get(name).map(|&i| &self.facets[i])
    }

    /// Unique facet names in document order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.facets.len());
        for facet in &self.facets {
            if !names.contains(&facet.name.as_str()) {
                names.push(&facet.name);
            }
        }
        names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Facet> {
        self.facets.iter()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

impl FromIterator<Facet> for FacetSet {
    fn from_iter<I: IntoIterator<Item = Facet>>(iter: I) -> Self {
        let mut set = Self::new();
        for facet in iter {
            set.push(facet);
        }
        set
    }
}

impl<'a> IntoIterator for &'a FacetSet {
    type Item = &'a Facet;
    type IntoIter = std::slice::Iter<'a, Facet>;

    fn into_iter(self) -> Self::IntoIter {
        self.facets.iter()
    }
}
