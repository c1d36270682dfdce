//! # dnz-client
//!
//! A Rust client for the DigitalNZ search API.
//!
//! Provides:
//! - **Query compilation**: structured filters and paging compiled into
//!   validated, versioned request URLs
//! - **Response decoding**: XML search responses decoded into results, facets
//!   and pagination; record documents decoded into namespaced metadata
//! - **CLI**: `dnz` binary for terminal use (feature `cli`)
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() -> dnz_client::error::Result<()> {
//! use dnz_client::{DnzClient, Filter, SearchOptions};
//!
//! // Create client from the DNZ_API_KEY environment variable
//! let client = DnzClient::from_env()?;
//!
//! // Rugby items that are images or web pages
//! let filter = Filter::new().field("category", ["Images", "Web pages"]);
//! let mut search = client
//!     .search("rugby", SearchOptions::new().filter(filter).facet("year"))
//!     .await?;
//!
//! println!("page {} of {}", search.page(), search.pages());
//! for item in search.results() {
//!     println!("{}", item.title().unwrap_or("-"));
//! }
//!
//! if let Some(years) = search.facets().get("year") {
//!     for year in years {
//!         println!("{}: {}", year.name, year.count);
//!     }
//! }
//!
//! search.set_page(2).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod custom_search;
pub mod error;
pub mod facet;
pub mod fetch;
pub mod filter;
pub mod metadata;
pub mod pagination;
pub mod record;
pub mod request;
pub mod response;
pub mod schema;
pub mod search;
pub mod xml;

// Re-export key types at the crate root.
pub use client::DnzClient;
pub use custom_search::CustomSearch;
pub use error::DnzError;
pub use facet::{Facet, FacetSet, FacetValue};
pub use fetch::{Fetch, HttpFetcher};
pub use filter::{Filter, FilterValue};
pub use metadata::{MetadataItem, MetadataList};
pub use pagination::Pagination;
pub use record::{NamespaceIndex, NodeSet, Record};
pub use request::{OptionValue, Options, RequestBuilder};
pub use response::{Item, SearchResponse};
pub use schema::{ApiVersion, Endpoint};
pub use search::{Search, SearchOptions, SortDirection};
