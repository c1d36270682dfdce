//! Unsaved custom searches and their previews.

use crate::client::DnzClient;
use crate::error::Result;
use crate::request::{OptionValue, Options};
use crate::response::{SearchResponse, DEFAULT_NUM_RESULTS};
use crate::schema::Endpoint;

/// Attributes describing a custom search (`title`, `search_term`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomSearch {
    attributes: Vec<(String, OptionValue)>,
}

impl CustomSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The search term, or empty when unset.
    pub fn text(&self) -> String {
        self.get("search_term")
            .map(OptionValue::to_query_value)
            .unwrap_or_default()
    }

    /// Wire options for the preview endpoint: every attribute as
    /// `custom_search[key]` plus a match-all search text.
    pub fn preview_options(&self) -> Options {
        let mut options = Options::new();
        options.insert("search_text", "*:*");
        for (key, value) in &self.attributes {
            options.insert(format!("custom_search[{}]", key), value.clone());
        }
        options
    }

    /// Run the custom search without saving it.
    ///
    /// Preview options are not part of the argument schema, so they are sent
    /// unvalidated.
    pub async fn preview(&self, client: &DnzClient) -> Result<SearchResponse> {
        let body = client
            .fetch_unchecked(Endpoint::CustomSearchPreview, self.preview_options())
            .await?;
        SearchResponse::parse(&body, DEFAULT_NUM_RESULTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::FakeFetcher;

    fn kittens() -> CustomSearch {
        CustomSearch::new()
            .set("title", "Kittens")
            .set("search_term", "kitten")
            .set("title", "Cats")
    }

    #[test]
    fn test_text_defaults_to_empty() {
        assert_eq!(CustomSearch::new().text(), "");
        assert_eq!(kittens().text(), "kitten");
    }

    #[test]
    fn test_preview_options() {
        let options = kittens().preview_options();
        assert_eq!(options.len(), 3);
        assert_eq!(
            options.get("custom_search[title]"),
            Some(&OptionValue::Text("Cats".to_string()))
        );
        assert!(options.contains_key("custom_search[search_term]"));
    }

    #[tokio::test]
    async fn test_preview_fetches_unvalidated() {
        let fake = FakeFetcher::new(vec![Ok(
            "<response><result-count>3</result-count></response>".to_string()
        )]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake).with_version("v2");

        let response = kittens().preview(&client).await.unwrap();
        assert_eq!(response.result_count, 3);

        let url = urls.lock().unwrap()[0].clone();
        assert!(url.starts_with("http://api.digitalnz.org/custom_searches/v2/test.xml?"));
        assert!(url.contains("custom_search%5Btitle%5D=Cats"));
        assert!(url.contains("search_text=%2A%3A%2A"));
    }
}
