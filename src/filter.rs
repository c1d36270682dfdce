//! Filter compilation.
//!
//! Turns an ordered set of field filters into DigitalNZ boolean search syntax
//! and combines it with the caller's free text.
//!
//! # Example
//!
//! ```
//! use dnz_client::Filter;
//!
//! let filter = Filter::new()
//!     .field("category", ["Images", "Videos"])
//!     .field("year", "1905");
//! assert_eq!(
//!     filter.compile("rugby"),
//!     "(rugby) AND (category:\"Images\" OR category:\"Videos\") AND (year:\"1905\")"
//! );
//! ```

use serde::Serialize;

/// Value(s) a field is filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    fn non_blank(&self) -> Vec<&str> {
        let values: Vec<&str> = match self {
            Self::One(v) => vec![v.as_str()],
            Self::Many(vs) => vs.iter().map(String::as_str).collect(),
        };
        values
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect()
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::One(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::One(v)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(vs: Vec<String>) -> Self {
        Self::Many(vs)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(vs: Vec<&str>) -> Self {
        Self::Many(vs.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(vs: [&str; N]) -> Self {
        Self::Many(vs.iter().map(|s| s.to_string()).collect())
    }
}

/// Field filters in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    fields: Vec<(String, FilterValue)>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field filter, keeping its original position on replace.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// In-place variant of [`Filter::field`].
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// True when the filter yields no clauses (no fields, or only blank values).
    pub fn is_empty(&self) -> bool {
        self.clauses().is_empty()
    }

    /// One clause per field with at least one non-blank value.
    fn clauses(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter_map(|(name, value)| {
                let terms: Vec<String> = value
                    .non_blank()
                    .into_iter()
                    .map(|v| format!("{}:\"{}\"", name, v))
                    .collect();
                if terms.is_empty() {
                    None
                } else {
                    Some(terms.join(" OR "))
                }
            })
            .collect()
    }

    /// Combine `free_text` with this filter.
    ///
    /// Without clauses the text is returned unchanged. Otherwise the free text
    /// and every clause are parenthesized and ANDed; blank free text is left out.
    pub fn compile(&self, free_text: &str) -> String {
        let clauses = self.clauses();
        if clauses.is_empty() {
            return free_text.to_string();
        }

        let text = free_text.trim();
        let mut parts = Vec::with_capacity(clauses.len() + 1);
        if !text.is_empty() {
            parts.push(format!("({})", text));
        }
        parts.extend(clauses.into_iter().map(|c| format!("({})", c)));
        parts.join(" AND ")
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (k, v) in iter {
            filter.insert(k, v);
        }
        filter
    }
}
