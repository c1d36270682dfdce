//! Search sessions.
//!
//! A [`Search`] compiles its filter once, fetches the first page on creation
//! and can be re-paged with [`Search::set_page`].

use crate::client::DnzClient;
use crate::error::{DnzError, Result};
use crate::facet::{FacetSet, FacetValue};
use crate::filter::Filter;
use crate::request::{OptionValue, Options};
use crate::response::{Item, SearchResponse, DEFAULT_NUM_RESULTS};
use crate::schema::Endpoint;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Options for a search.
///
/// `filter` and `page` are applied locally: the filter is compiled into the
/// search text and the page is converted into a `start` offset.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub num_results: Option<u32>,
    pub start: Option<u64>,
    pub page: Option<u64>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
    pub facets: Vec<String>,
    pub facet_num_results: Option<u32>,
    pub facet_start: Option<u32>,
    pub filter: Filter,
    pub custom_search: Option<String>,
    /// Raw wire options; typed fields take precedence.
    pub extra: Options,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_results(mut self, n: u32) -> Self {
        self.num_results = Some(n);
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// Select a 1-based page; overrides `start`.
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(field.into());
        self.direction = Some(direction);
        self
    }

    pub fn facet(mut self, name: impl Into<String>) -> Self {
        self.facets.push(name.into());
        self
    }

    pub fn facet_num_results(mut self, n: u32) -> Self {
        self.facet_num_results = Some(n);
        self
    }

    pub fn facet_start(mut self, n: u32) -> Self {
        self.facet_start = Some(n);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn custom_search(mut self, name: impl Into<String>) -> Self {
        self.custom_search = Some(name.into());
        self
    }

    /// Pass a raw option through to the wire.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// Page size: the typed field, then a raw `num_results`, then the default.
    fn requested(&self) -> u32 {
        self.num_results
            .or_else(|| match self.extra.get("num_results")? {
                OptionValue::Int(n) => u32::try_from(*n).ok(),
                OptionValue::Text(s) => s.trim().parse().ok(),
                OptionValue::List(_) => None,
            })
            .unwrap_or(DEFAULT_NUM_RESULTS)
    }

    fn endpoint(&self) -> Endpoint {
        if self.custom_search.is_some() {
            Endpoint::CustomSearch
        } else {
            Endpoint::Search
        }
    }

    /// Wire options for an already-compiled search text.
    ///
    /// Typed fields win over raw options, which win over the defaults.
    fn to_wire(&self, search_text: &str) -> Result<Options> {
        let mut options = self.extra.clone();
        let num_results = self.requested();

        options.insert("search_text", search_text);
        match self.num_results {
            Some(n) => options.insert("num_results", n),
            None => options.insert_default("num_results", num_results),
        }
        match (self.page, self.start) {
            (Some(page), _) => options.insert("start", page_start(page, num_results)?),
            (None, Some(start)) => options.insert("start", start),
            (None, None) => options.insert_default("start", 0i64),
        }

        if let Some(sort) = &self.sort {
            options.insert("sort", sort.as_str());
        }
        if let Some(direction) = self.direction {
            options.insert("direction", direction.as_str());
        }
        if !self.facets.is_empty() {
            options.insert("facets", self.facets.clone());
        }
        if let Some(n) = self.facet_num_results {
            options.insert("facet_num_results", n);
        }
        if let Some(n) = self.facet_start {
            options.insert("facet_start", n);
        }
        if let Some(name) = &self.custom_search {
            options.insert("custom_search", name.as_str());
        }
        Ok(options)
    }
}

/// Offset of the first result on a 1-based page.
fn page_start(page: u64, per_page: u32) -> Result<i64> {
    page.saturating_sub(1)
        .checked_mul(u64::from(per_page))
        .and_then(|start| i64::try_from(start).ok())
        .ok_or_else(|| DnzError::Config(format!("page {} is out of range", page)))
}

/// An executed search.
pub struct Search {
    client: DnzClient,
    endpoint: Endpoint,
    text: String,
    options: Options,
    response: SearchResponse,
}

impl Search {
    /// Compile, fetch and decode the first page.
    pub async fn execute(client: DnzClient, text: &str, options: SearchOptions) -> Result<Self> {
        let compiled = options.filter.compile(text);
        let endpoint = options.endpoint();
        let wire = options.to_wire(&compiled)?;

        let response = fetch_page(&client, endpoint, &wire, options.requested()).await?;

        Ok(Self {
            client,
            endpoint,
            text: compiled,
            options: wire,
            response,
        })
    }

    /// Fetch a different 1-based page. On error the current page is kept.
    pub async fn set_page(&mut self, page: u64) -> Result<()> {
        let requested = self.response.num_results_requested;

        let mut options = self.options.clone();
        options.insert("start", page_start(page, requested.max(1))?);

        let response = fetch_page(&self.client, self.endpoint, &options, requested).await?;
        self.options = options;
        self.response = response;
        Ok(())
    }

    pub fn results(&self) -> &[Item] {
        &self.response.results
    }

    pub fn facets(&self) -> &FacetSet {
        &self.response.facets
    }

    pub fn page(&self) -> u64 {
        self.response.page()
    }

    pub fn pages(&self) -> u64 {
        self.response.pages()
    }

    pub fn result_count(&self) -> u64 {
        self.response.result_count
    }

    pub fn num_results_requested(&self) -> u32 {
        self.response.num_results_requested
    }

    /// Compiled search text (free text combined with filters).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Wire options used for the last fetch.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn response(&self) -> &SearchResponse {
        &self.response
    }

    pub fn into_response(self) -> SearchResponse {
        self.response
    }
}

impl std::fmt::Debug for Search {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("results", &self.response.results.len())
            .field("facets", &self.response.facets.len())
            .field("page", &self.page())
            .field("pages", &self.pages())
            .finish()
    }
}

async fn fetch_page(
    client: &DnzClient,
    endpoint: Endpoint,
    options: &Options,
    requested: u32,
) -> Result<SearchResponse> {
    let body = client.fetch(endpoint, options.clone()).await?;
    SearchResponse::parse(&body, requested)
}

impl DnzClient {
    /// Run a search.
    ///
    /// Uses DigitalNZ query syntax for `text`; structured filters go in
    /// [`SearchOptions::filter`].
    pub async fn search(&self, text: &str, options: SearchOptions) -> Result<Search> {
        Search::execute(self.clone(), text, options).await
    }

    /// All values of the `category` facet.
    pub async fn categories(&self, options: SearchOptions) -> Result<Vec<FacetValue>> {
        let mut options = options;
        options.facets = vec!["category".to_string()];
        options.facet_num_results = Some(100);

        let search = self.search("*:*", options).await?;
        Ok(search
            .facets()
            .get("category")
            .map(|f| f.values().to_vec())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::FakeFetcher;

    const PAGE_ONE: &str = r#"<response>
      <num-results-requested type="integer">20</num-results-requested>
      <result-count type="integer">45</result-count>
      <start type="integer">0</start>
      <results><result><title>First</title></result></results>
      <facets/>
    </response>"#;

    const PAGE_TWO: &str = r#"<response>
      <num-results-requested type="integer">20</num-results-requested>
      <result-count type="integer">45</result-count>
      <start type="integer">20</start>
      <results><result><title>Second</title></result></results>
    </response>"#;

    const CATEGORIES: &str = r#"<response>
      <result-count type="integer">10</result-count>
      <facets>
        <facet>
          <facet-field>category</facet-field>
          <values>
            <value><name>Images</name><num-results>7</num-results></value>
            <value><name>Videos</name><num-results>3</num-results></value>
          </values>
        </facet>
      </facets>
    </response>"#;

    #[tokio::test]
    async fn test_search_compiles_filter_into_text() {
        let fake = FakeFetcher::new(vec![Ok(PAGE_ONE.to_string())]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake);

        let options = SearchOptions::new().filter(Filter::new().field("category", "Images"));
        let search = client.search("test", options).await.unwrap();

        assert_eq!(search.text(), "(test) AND (category:\"Images\")");
        assert_eq!(
            search.options().get("search_text"),
            Some(&OptionValue::Text("(test) AND (category:\"Images\")".to_string()))
        );
        assert!(!search.options().contains_key("filter"));

        let url = urls.lock().unwrap()[0].clone();
        assert!(url.contains("search_text=%28test%29%20AND%20%28category%3A%22Images%22%29"));
        assert!(url.contains("num_results=20"));
        assert!(url.contains("start=0"));
    }

    #[tokio::test]
    async fn test_search_decodes_response() {
        let client = DnzClient::with_fetcher("abc", FakeFetcher::new(vec![Ok(PAGE_ONE.to_string())]));
        let search = client.search("test", SearchOptions::new()).await.unwrap();

        assert_eq!(search.text(), "test");
        assert_eq!(search.result_count(), 45);
        assert_eq!(search.results()[0].title(), Some("First"));
        assert_eq!((search.page(), search.pages()), (1, 3));
        assert!(search.facets().is_empty());
    }

    #[tokio::test]
    async fn test_page_option_becomes_start() {
        let fake = FakeFetcher::new(vec![Ok(PAGE_TWO.to_string())]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake);

        let search = client
            .search("test", SearchOptions::new().num_results(20).page(2))
            .await
            .unwrap();
        assert!(urls.lock().unwrap()[0].contains("start=20"));
        assert_eq!(search.page(), 2);
    }

    #[tokio::test]
    async fn test_set_page_refetches() {
        let fake = FakeFetcher::new(vec![Ok(PAGE_ONE.to_string()), Ok(PAGE_TWO.to_string())]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake);

        let mut search = client.search("test", SearchOptions::new()).await.unwrap();
        search.set_page(2).await.unwrap();

        assert_eq!(urls.lock().unwrap().len(), 2);
        assert!(urls.lock().unwrap()[1].contains("start=20"));
        assert_eq!(search.page(), 2);
        assert_eq!(search.results()[0].title(), Some("Second"));
        assert_eq!(search.options().get("start"), Some(&OptionValue::Int(20)));
    }

    #[tokio::test]
    async fn test_failed_set_page_keeps_previous_state() {
        let fake = FakeFetcher::new(vec![
            Ok(PAGE_ONE.to_string()),
            Ok("<response><results>".to_string()),
        ]);
        let client = DnzClient::with_fetcher("abc", fake);

        let mut search = client.search("test", SearchOptions::new()).await.unwrap();
        let err = search.set_page(2).await.unwrap_err();

        assert!(matches!(err, DnzError::MalformedResponse(_)));
        assert_eq!(search.page(), 1);
        assert_eq!(search.results()[0].title(), Some("First"));
        assert_eq!(search.options().get("start"), Some(&OptionValue::Int(0)));
    }

    #[tokio::test]
    async fn test_search_with_rejected_key() {
        let fake = FakeFetcher::new(vec![Err(DnzError::Api {
            status: 401,
            message: String::new(),
        })]);
        let client = DnzClient::with_fetcher("secret", fake);

        let err = client.search("test", SearchOptions::new()).await.unwrap_err();
        assert!(matches!(err, DnzError::InvalidApiKey { api_key } if api_key == "secret"));
    }

    #[tokio::test]
    async fn test_custom_search_endpoint() {
        let fake = FakeFetcher::new(vec![Ok(PAGE_ONE.to_string())]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake);

        let search = client
            .search("test", SearchOptions::new().custom_search("kittens"))
            .await
            .unwrap();
        assert_eq!(search.endpoint(), Endpoint::CustomSearch);
        assert!(urls.lock().unwrap()[0]
            .starts_with("http://api.digitalnz.org/custom_searches/v1/kittens.xml?"));
    }

    #[tokio::test]
    async fn test_v1_custom_search_rejects_facets() {
        let client = DnzClient::with_fetcher("abc", FakeFetcher::default());
        let err = client
            .search(
                "test",
                SearchOptions::new().custom_search("kittens").facet("category"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DnzError::InvalidOption { .. }));
    }

    #[tokio::test]
    async fn test_categories() {
        let fake = FakeFetcher::new(vec![Ok(CATEGORIES.to_string())]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake);

        let categories = client.categories(SearchOptions::new()).await.unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Images", "Videos"]);

        let url = urls.lock().unwrap()[0].clone();
        assert!(url.contains("facets=category"));
        assert!(url.contains("facet_num_results=100"));
    }

    #[test]
    fn test_sort_options() {
        let wire = SearchOptions::new()
            .sort("date", SortDirection::Desc)
            .to_wire("x")
            .unwrap();
        assert_eq!(wire.get("sort"), Some(&OptionValue::Text("date".to_string())));
        assert_eq!(wire.get("direction"), Some(&OptionValue::Text("desc".to_string())));
    }

    #[test]
    fn test_typed_fields_override_extra() {
        let wire = SearchOptions::new()
            .option("num_results", "99")
            .num_results(5)
            .to_wire("x")
            .unwrap();
        assert_eq!(wire.get("num_results"), Some(&OptionValue::Int(5)));
    }

    #[tokio::test]
    async fn test_raw_paging_options_reach_the_wire() {
        let fake = FakeFetcher::new(vec![Ok("<response/>".to_string())]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake);

        let search = client
            .search(
                "x",
                SearchOptions::new()
                    .option("num_results", 50i64)
                    .option("start", 40i64),
            )
            .await
            .unwrap();

        assert_eq!(
            urls.lock().unwrap()[0],
            "http://api.digitalnz.org/records/v1.xml/?api_key=abc&num_results=50&search_text=x&start=40"
        );
        assert_eq!(search.num_results_requested(), 50);
        assert_eq!(search.page(), 1);
    }

    #[test]
    fn test_raw_num_results_sets_page_size() {
        let wire = SearchOptions::new()
            .option("num_results", "30")
            .page(3)
            .to_wire("x")
            .unwrap();
        assert_eq!(wire.get("num_results"), Some(&OptionValue::Text("30".to_string())));
        assert_eq!(wire.get("start"), Some(&OptionValue::Int(60)));
    }

    #[test]
    fn test_huge_page_is_rejected() {
        let err = SearchOptions::new().page(u64::MAX).to_wire("x").unwrap_err();
        assert!(matches!(err, DnzError::Config(_)));
    }

    #[tokio::test]
    async fn test_set_page_out_of_range_keeps_state() {
        let fake = FakeFetcher::new(vec![Ok(PAGE_ONE.to_string())]);
        let urls = fake.urls.clone();
        let client = DnzClient::with_fetcher("abc", fake);

        let mut search = client.search("test", SearchOptions::new()).await.unwrap();
        let err = search.set_page(u64::MAX).await.unwrap_err();

        assert!(matches!(err, DnzError::Config(_)));
        assert_eq!(urls.lock().unwrap().len(), 1);
        assert_eq!(search.options().get("start"), Some(&OptionValue::Int(0)));
    }
}
