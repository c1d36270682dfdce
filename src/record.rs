//! Record documents.
//!
//! A record is a METS document whose `xmlData` sections hold namespaced
//! metadata elements:
//!
//! ```xml
//! <xmlData xmlns:dc="...">
//!   <dc:title>Test</dc:title>
//! </xmlData>
//! <xmlData xmlns:dnz="...">
//!   <dnz:tag type="user">ok</dnz:tag>
//!   <dnz:content_partner>National Library</dnz:content_partner>
//! </xmlData>
//! ```
//!
//! Those elements are indexed by prefix and tag name once, when the record is
//! parsed: `record.data().namespace("dnz").get("tag").text() == "ok"`.

use crate::client::DnzClient;
use crate::error::Result;
use crate::metadata::{MetadataItem, MetadataList};
use crate::request::Options;
use crate::schema::Endpoint;
use crate::xml::Element;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default)]
struct PrefixIndex {
    all: Vec<usize>,
    by_name: HashMap<String, Vec<usize>>,
}

/// Metadata elements indexed by namespace prefix and tag name.
///
/// Prefixes are lower-cased; elements without a prefix are filed under `""`.
#[derive(Debug, Clone, Default)]
pub struct NamespaceIndex {
    elements: Vec<Element>,
    by_prefix: HashMap<String, PrefixIndex>,
    by_name: HashMap<String, Vec<usize>>,
}

impl NamespaceIndex {
    pub fn new(elements: Vec<Element>) -> Self {
        let mut by_prefix: HashMap<String, PrefixIndex> = HashMap::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, element) in elements.iter().enumerate() {
            let prefix = element.prefix().unwrap_or("").to_lowercase();
            let entry = by_prefix.entry(prefix).or_default();
            entry.all.push(i);
            entry
                .by_name
                .entry(element.name().to_string())
                .or_default()
                .push(i);
            by_name.entry(element.name().to_string()).or_default().push(i);
        }

        Self {
            elements,
            by_prefix,
            by_name,
        }
    }

    fn set(&self, indices: Option<&Vec<usize>>) -> NodeSet<'_> {
        NodeSet {
            nodes: indices
                .map(|ix| ix.iter().map(|&i| &self.elements[i]).collect())
                .unwrap_or_default(),
        }
    }

    /// Every element in document order.
    pub fn all(&self) -> NodeSet<'_> {
        NodeSet {
            nodes: self.elements.iter().collect(),
        }
    }

    /// Elements with the given prefix (case-insensitive).
    pub fn namespace(&self, prefix: &str) -> NodeSet<'_> {
        self.set(
            self.by_prefix
                .get(&prefix.to_lowercase())
                .map(|p| &p.all),
        )
    }

    /// Elements with the given prefix and tag name.
    pub fn element(&self, prefix: &str, name: &str) -> NodeSet<'_> {
        self.set(
            self.by_prefix
                .get(&prefix.to_lowercase())
                .and_then(|p| p.by_name.get(name)),
        )
    }

    /// Elements with the given tag name, any prefix.
    pub fn named(&self, name: &str) -> NodeSet<'_> {
        self.set(self.by_name.get(name))
    }

    /// Prefix lookup, falling back to tag name when no prefix matches.
    pub fn lookup(&self, key: &str) -> NodeSet<'_> {
        let by_prefix = self.namespace(key);
        if by_prefix.is_empty() {
            self.named(key)
        } else {
            by_prefix
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for NamespaceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.all(), f)
    }
}

/// A view over matched elements. Unmatched lookups give an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet<'a> {
    nodes: Vec<&'a Element>,
}

impl<'a> NodeSet<'a> {
    /// Narrow by prefix, falling back to tag name.
    pub fn get(&self, key: &str) -> NodeSet<'a> {
        let key_lower = key.to_lowercase();
        let by_prefix: Vec<&'a Element> = self
            .nodes
            .iter()
            .copied()
            .filter(|e| e.prefix().unwrap_or("").to_lowercase() == key_lower)
            .collect();
        if !by_prefix.is_empty() {
            return NodeSet { nodes: by_prefix };
        }

        NodeSet {
            nodes: self
                .nodes
                .iter()
                .copied()
                .filter(|e| e.name() == key)
                .collect(),
        }
    }

    /// Unique lower-cased tag names in document order.
    pub fn names(&self) -> Vec<String> {
        unique(self.nodes.iter().map(|e| e.name().to_lowercase()))
    }

    /// Unique lower-cased prefixes in document order.
    pub fn namespaces(&self) -> Vec<String> {
        unique(
            self.nodes
                .iter()
                .map(|e| e.prefix().unwrap_or("").to_lowercase()),
        )
    }

    /// Combined text of all elements.
    pub fn text(&self) -> String {
        self.nodes.iter().map(|e| e.text()).collect()
    }

    /// Text of each element.
    pub fn texts(&self) -> Vec<String> {
        self.nodes.iter().map(|e| e.text()).collect()
    }

    pub fn first(&self) -> Option<&'a Element> {
        self.nodes.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Element> + '_ {
        self.nodes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for NodeSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self
            .namespaces()
            .into_iter()
            .map(|ns| format!("{} => [ {} ]", ns, self.get(&ns).names().join(", ")))
            .collect();
        f.write_str(&groups.join(", "))
    }
}

fn unique(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// A single record and its metadata.
#[derive(Debug, Clone)]
pub struct Record {
    id: String,
    root: Element,
    data: NamespaceIndex,
    metadata: MetadataList,
}

impl Record {
    /// Parse a record document.
    pub fn parse(id: impl Into<String>, xml: &str) -> Result<Self> {
        let root = Element::parse(xml)?;

        let elements: Vec<Element> = root
            .descendants_named("xmlData")
            .into_iter()
            .flat_map(|section| section.children().cloned())
            .collect();
        let data = NamespaceIndex::new(elements);

        let metadata = data
            .iter()
            .map(|node| {
                MetadataItem::new(
                    node.prefix().unwrap_or(""),
                    node.name(),
                    node.text(),
                    node.attribute("type") == Some("user"),
                )
            })
            .collect();

        tracing::debug!(elements = data.len(), "parsed record");
        Ok(Self {
            id: id.into(),
            root,
            data,
            metadata,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The whole document.
    pub fn document(&self) -> &Element {
        &self.root
    }

    /// Metadata elements indexed by namespace.
    pub fn data(&self) -> &NamespaceIndex {
        &self.data
    }

    pub fn metadata(&self) -> &MetadataList {
        &self.metadata
    }

    /// Root element attribute, case-insensitive (e.g. `objid` for `OBJID`).
    pub fn root_attribute(&self, name: &str) -> Option<&str> {
        self.root.attribute_ignore_case(name)
    }

    /// The landing page URL from `dnz:landing_url`, with the doubled
    /// ampersand escapes some providers emit collapsed.
    pub fn source_url(&self) -> Option<String> {
        let landing = self
            .data
            .element("dnz", "landing_url")
            .first()
            .map(Element::text)?;
        let landing = landing.trim();
        if landing.is_empty() {
            return None;
        }
        Some(landing.replace("&amp;amp;", "&").replace("&amp;", "&"))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record{{ {} }}", self.data)
    }
}

impl DnzClient {
    /// Fetch a single record by id.
    pub async fn record(&self, id: &str) -> Result<Record> {
        let mut options = Options::new();
        options.insert("id", id);
        let body = self.fetch(Endpoint::Record, options).await?;
        Record::parse(id, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::FakeFetcher;
    use crate::error::DnzError;

    const RECORD_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<mets OBJID="oai:horowhenua.kete.net.nz:site:StillImage:12647" PROFILE="GDL-NLNZ" xmlns="http://www.loc.gov/METS/">
 <dmdSec ID="dc">
  <mdWrap MIMETYPE="text/xml" MDTYPE="DC">
   <xmlData xmlns:dc="http://www.example.com/example">
    <dc:creator>Pippa</dc:creator>
    <dc:creator>pmc1</dc:creator>
    <dc:title>test angel</dc:title>
    <dc:type>InteractiveResource</dc:type>
    <dc:type>AnotherType</dc:type>
   </xmlData>
  </mdWrap>
 </dmdSec>
 <dmdSec ID="dnz">
  <mdWrap MIMETYPE="text/xml" MDTYPE="OTHER">
   <xmlData xmlns:dnz="http://www.example.com/example">
    <dnz:category>Images</dnz:category>
    <dnz:landing_url>http://example.com/show?a=1&amp;amp;b=2</dnz:landing_url>
    <dnz:tag type="user">moe::status::restricted</dnz:tag>
    <dnz:tag>plain</dnz:tag>
   </xmlData>
  </mdWrap>
 </dmdSec>
</mets>"#;

    fn record() -> Record {
        Record::parse("12647", RECORD_XML).unwrap()
    }

    #[test]
    fn test_namespace_lookup() {
        let r = record();
        assert_eq!(r.data().len(), 9);
        assert_eq!(r.data().namespace("dc").len(), 5);
        assert_eq!(r.data().namespace("DNZ").len(), 4);
        assert_eq!(r.data().namespace("dc").get("title").text(), "test angel");
        assert_eq!(r.data().element("dc", "creator").texts(), vec!["Pippa", "pmc1"]);
    }

    #[test]
    fn test_unmatched_lookups_are_empty() {
        let r = record();
        assert!(r.data().namespace("marc").is_empty());
        assert!(r.data().element("dc", "nothing").is_empty());
        assert!(r.data().namespace("dc").get("nothing").is_empty());
        assert_eq!(r.data().named("nothing").text(), "");
    }

    #[test]
    fn test_lookup_falls_back_to_name() {
        let r = record();
        assert_eq!(r.data().lookup("title").text(), "test angel");
        assert_eq!(r.data().lookup("dnz").len(), 4);
        assert_eq!(r.data().named("type").len(), 2);
    }

    #[test]
    fn test_names_and_namespaces() {
        let r = record();
        assert_eq!(r.data().all().namespaces(), vec!["dc", "dnz"]);
        assert_eq!(
            r.data().namespace("dc").names(),
            vec!["creator", "title", "type"]
        );
        assert_eq!(
            r.to_string(),
            "Record{ dc => [ creator, title, type ], dnz => [ category, landing_url, tag ] }"
        );
    }

    #[test]
    fn test_metadata_items() {
        let r = record();
        let tags = r.metadata().find_by_name("tag");
        assert_eq!(tags.len(), 2);

        let restricted = tags.find_by_user_contributed(true);
        let item = restricted.first().unwrap();
        assert_eq!(item.schema(), "dnz");
        assert_eq!(item.value(), "restricted");
        assert!(item.in_namespace("moe::status"));

        assert_eq!(r.metadata().find_by_namespace("").len(), 8);
    }

    #[test]
    fn test_root_attribute_and_source_url() {
        let r = record();
        assert_eq!(r.id(), "12647");
        assert_eq!(r.root_attribute("profile"), Some("GDL-NLNZ"));
        assert!(r.root_attribute("missing").is_none());
        assert_eq!(
            r.source_url().as_deref(),
            Some("http://example.com/show?a=1&b=2")
        );
    }

    #[test]
    fn test_record_without_data() {
        let r = Record::parse("1", "<mets/>").unwrap();
        assert!(r.data().is_empty());
        assert!(r.metadata().is_empty());
        assert!(r.source_url().is_none());
    }

    #[tokio::test]
    async fn test_client_record_fetch() {
        let fake = FakeFetcher::new(vec![Ok(RECORD_XML.to_string())]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake);

        let r = client.record("12647").await.unwrap();
        assert_eq!(r.metadata().len(), 9);
        assert_eq!(
            urls.lock().unwrap()[0],
            "http://api.digitalnz.org/records/v1/12647.xml?api_key=abc"
        );
    }

    #[tokio::test]
    async fn test_malformed_record() {
        let fake = FakeFetcher::new(vec![Ok("<mets><xmlData></mets>".to_string())]);
        let client = DnzClient::with_fetcher("abc", fake);
        let err = client.record("1").await.unwrap_err();
        assert!(matches!(err, DnzError::MalformedResponse(_)));
    }
}
