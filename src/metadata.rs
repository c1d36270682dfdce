//! Record metadata items.
//!
//! Each metadata item carries a schema (the XML namespace prefix of its tag),
//! a name and a value. Values may themselves be namespaced with `::`:
//! `moe::status::restricted` lives in namespace `moe::status` and has the
//! value `restricted`. Values without `::` live in the root namespace.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One metadata element of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    schema: String,
    name: String,
    raw_value: String,
    user_contributed: bool,
    segments: Vec<String>,
}

impl MetadataItem {
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        raw_value: impl Into<String>,
        user_contributed: bool,
    ) -> Self {
        let raw_value = raw_value.into();
        let segments = split_segments(&raw_value);
        Self {
            schema: schema.into(),
            name: name.into(),
            raw_value,
            user_contributed,
            segments,
        }
    }

    /// XML namespace prefix of the element, e.g. `dc`.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value including any `::` namespace.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Whether the element was marked `type="user"`.
    pub fn user_contributed(&self) -> bool {
        self.user_contributed
    }

    /// The value with its namespace removed.
    pub fn value(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Namespace segments preceding the value; empty for root items.
    pub fn namespace(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }

    pub fn is_root(&self) -> bool {
        self.namespace().is_empty()
    }

    /// Whether this item lives in `namespace` (`::`-separated).
    ///
    /// The blank namespace matches only root items; namespaced items match any
    /// leading run of their segments, value included.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        let namespace = namespace.trim();
        match (namespace.is_empty(), self.is_root()) {
            (true, root) => root,
            (false, true) => false,
            (false, false) => {
                let wanted = split_segments(namespace);
                wanted.len() <= self.segments.len()
                    && self.segments.iter().zip(&wanted).all(|(a, b)| a == b)
            }
        }
    }

    /// Serialize back to an XML element: `<dnz:tag type="user">raw</dnz:tag>`.
    pub fn to_tag(&self) -> String {
        let qname = format!("{}:{}", self.schema, self.name);
        let kind = if self.user_contributed {
            " type=\"user\""
        } else {
            ""
        };
        format!(
            "<{}{}>{}</{}>",
            qname,
            kind,
            quick_xml::escape::escape(self.raw_value.as_str()),
            qname
        )
    }
}

impl std::fmt::Display for MetadataItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_value)
    }
}

impl Serialize for MetadataItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MetadataItem", 5)?;
        s.serialize_field("schema", &self.schema)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("value", self.value())?;
        s.serialize_field("namespace", &self.namespace().join("::"))?;
        s.serialize_field("user_contributed", &self.user_contributed)?;
        s.end()
    }
}

/// Split on `::`, dropping trailing empty segments.
fn split_segments(value: &str) -> Vec<String> {
    let mut segments: Vec<String> = value.split("::").map(String::from).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

/// Metadata items of a record, with filtering helpers.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct MetadataList(Vec<MetadataItem>);

impl MetadataList {
    pub fn new(items: Vec<MetadataItem>) -> Self {
        Self(items)
    }

    fn select(&self, keep: impl Fn(&MetadataItem) -> bool) -> Self {
        Self(self.0.iter().filter(|m| keep(m)).cloned().collect())
    }

    pub fn find_by_schema(&self, schema: &str) -> Self {
        self.select(|m| m.schema == schema)
    }

    pub fn find_by_name(&self, name: &str) -> Self {
        self.select(|m| m.name == name)
    }

    pub fn find_by_namespace(&self, namespace: &str) -> Self {
        self.select(|m| m.in_namespace(namespace))
    }

    pub fn find_by_user_contributed(&self, user_contributed: bool) -> Self {
        self.select(|m| m.user_contributed == user_contributed)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataItem> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&MetadataItem> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<MetadataItem> for MetadataList {
    fn from_iter<I: IntoIterator<Item = MetadataItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MetadataList {
    type Item = &'a MetadataItem;
    type IntoIter = std::slice::Iter<'a, MetadataItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restricted() -> MetadataItem {
        MetadataItem::new("dnz", "tag", "moe::status::restricted", true)
    }

    #[test]
    fn test_namespaced_value() {
        let item = restricted();
        assert_eq!(item.value(), "restricted");
        assert_eq!(item.namespace(), ["moe", "status"]);
        assert_eq!(item.raw_value(), "moe::status::restricted");
        assert!(!item.is_root());
    }

    #[test]
    fn test_in_namespace() {
        let item = restricted();
        assert!(item.in_namespace("moe"));
        assert!(item.in_namespace("moe::status"));
        assert!(item.in_namespace("moe::status::restricted"));
        assert!(!item.in_namespace("moe::other"));
        assert!(!item.in_namespace("moe::status::restricted::more"));
        assert!(!item.in_namespace(""));
    }

    #[test]
    fn test_root_namespace() {
        let item = MetadataItem::new("dnz", "tag", "ok", false);
        assert_eq!(item.value(), "ok");
        assert!(item.namespace().is_empty());
        assert!(item.in_namespace(""));
        assert!(item.in_namespace("  "));
        assert!(!item.in_namespace("moe"));
    }

    #[test]
    fn test_trailing_separator_is_ignored() {
        let item = MetadataItem::new("dnz", "tag", "moe::status::", false);
        assert_eq!(item.value(), "status");
        assert_eq!(item.namespace(), ["moe"]);
    }

    #[test]
    fn test_to_tag() {
        assert_eq!(
            restricted().to_tag(),
            "<dnz:tag type=\"user\">moe::status::restricted</dnz:tag>"
        );
        assert_eq!(
            MetadataItem::new("dc", "title", "Fish & Chips", false).to_tag(),
            "<dc:title>Fish &amp; Chips</dc:title>"
        );
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(restricted()).unwrap();
        assert_eq!(json["value"], "restricted");
        assert_eq!(json["namespace"], "moe::status");
        assert_eq!(json["schema"], "dnz");
    }

    #[test]
    fn test_list_filters() {
        let list: MetadataList = [
            MetadataItem::new("dc", "title", "Test", false),
            MetadataItem::new("dc", "subject", "Layout", false),
            restricted(),
            MetadataItem::new("dnz", "tag", "plain", true),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.find_by_schema("dc").len(), 2);
        assert_eq!(list.find_by_name("tag").len(), 2);
        assert_eq!(list.find_by_namespace("moe").len(), 1);
        assert_eq!(list.find_by_namespace("").len(), 3);
        assert_eq!(list.find_by_user_contributed(true).len(), 2);
        assert_eq!(
            list.find_by_schema("dnz")
                .find_by_namespace("")
                .first()
                .map(|m| m.value()),
            Some("plain")
        );
    }
}
