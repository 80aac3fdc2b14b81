//! Search client for the Likeminded API.
//!
//! [`LikeMindedClient`] binds an API key and a [`Transport`] and exposes the
//! paginated search entry point. Every call returns a [`SearchResultPage`]
//! holding one page of references plus a [`NextPage`] handle that fetches the
//! following page only when asked to.
//!
//! ```rust,no_run
//! use likeminded::client::LikeMindedClient;
//! use likeminded::models::{SearchRequest, SearchType};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LikeMindedClient::new("my-api-key")?;
//! let request = SearchRequest::new("food bank")
//!     .category(vec![3, 7])
//!     .search_type(SearchType::Resource);
//!
//! let first = client.search(&request).await?;
//! println!("{} references available", first.available());
//!
//! let second = first.next_page().fetch().await?;
//! for reference in &second {
//!     println!("{} ({})", reference.name(), reference.url());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
mod results;

pub use mock::{MockTransport, RecordedCall};
pub use results::make_search_result_page;

use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::Config;
use crate::models::{NextPage, SearchRequest, SearchResultPage};
use crate::utils::{decode, HttpTransport, Transport, DEFAULT_BASE_URL};
use crate::utils::streaming::{self, ReferenceStream};

/// Path of the search endpoint, relative to the base URL
pub const DEFAULT_SEARCH_PATH: &str = "/search/";

/// Errors that can occur when talking to the search API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network or HTTP failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body is not the expected XML shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// A reference was requested for a tag that is neither project nor resource
    #[error("Invalid reference kind: {0}")]
    InvalidReferenceKind(String),

    /// Invalid client construction or request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key; keep it out of error messages.
        ClientError::Transport(err.without_url().to_string())
    }
}

impl From<quick_xml::Error> for ClientError {
    fn from(err: quick_xml::Error) -> Self {
        ClientError::Decode(format!("XML: {}", err))
    }
}

/// Client for the Likeminded search API.
///
/// Holds no per-call state; clones share the same transport.
#[derive(Clone)]
pub struct LikeMindedClient {
    api_key: Arc<str>,
    search_path: Arc<str>,
    transport: Arc<dyn Transport>,
}

impl LikeMindedClient {
    /// Create a client talking to the public API over HTTP
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(DEFAULT_BASE_URL)?;
        Self::with_transport(api_key, Arc::new(transport))
    }

    /// Create a client with a custom transport (for testing or proxies)
    pub fn with_transport(
        api_key: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClientError::InvalidRequest("API key is empty".to_string()));
        }

        Ok(Self {
            api_key: api_key.into(),
            search_path: DEFAULT_SEARCH_PATH.into(),
            transport,
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let api_key = config.api.api_key.clone().ok_or_else(|| {
            ClientError::InvalidRequest(
                "no API key configured (set LIKEMINDED_API_KEY or [api] api_key)".to_string(),
            )
        })?;

        let transport = HttpTransport::with_settings(&config.api.base_url, &config.http)?;
        let client = Self::with_transport(api_key, Arc::new(transport))?;
        Ok(client.with_search_path(&config.api.search_path))
    }

    /// Override the search endpoint path
    pub fn with_search_path(mut self, path: &str) -> Self {
        self.search_path = path.into();
        self
    }

    /// Search projects and resources, returning the first page
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResultPage, ClientError> {
        self.fetcher(request).fetch(1).await
    }

    /// Fetch a specific page (1-based) directly.
    ///
    /// Pages `0` and `u32::MAX` are rejected with
    /// [`ClientError::InvalidRequest`] before any request is made.
    pub async fn search_page(
        &self,
        request: &SearchRequest,
        page: u32,
    ) -> Result<SearchResultPage, ClientError> {
        self.fetcher(request).fetch(page).await
    }

    /// Stream every reference across pages, fetching each page on demand.
    ///
    /// `max_pages` caps the number of pages requested.
    pub fn stream(&self, request: &SearchRequest, max_pages: Option<usize>) -> ReferenceStream {
        streaming::reference_stream_from(self.page_handle(request, 1), max_pages)
    }

    /// Deferred handle for one page of `request`; nothing is fetched until
    /// [`NextPage::fetch`] is called.
    pub fn page_handle(&self, request: &SearchRequest, page: u32) -> NextPage {
        NextPage::new(self.fetcher(request), page)
    }

    fn fetcher(&self, request: &SearchRequest) -> PageFetcher {
        PageFetcher {
            transport: Arc::clone(&self.transport),
            search_path: Arc::clone(&self.search_path),
            api_key: Arc::clone(&self.api_key),
            request: Arc::new(request.clone()),
        }
    }
}

impl std::fmt::Debug for LikeMindedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeMindedClient")
            .field("api_key", &"<redacted>")
            .field("search_path", &self.search_path)
            .field("transport", &self.transport)
            .finish()
    }
}

/// Everything needed to request any page of one search.
///
/// Captured by value in each [`NextPage`], so evaluating handles from
/// different pages in any order always requests the right page.
#[derive(Clone)]
pub(crate) struct PageFetcher {
    transport: Arc<dyn Transport>,
    search_path: Arc<str>,
    api_key: Arc<str>,
    request: Arc<SearchRequest>,
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("search_path", &self.search_path)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl PageFetcher {
    pub(crate) async fn fetch(&self, page: u32) -> Result<SearchResultPage, ClientError> {
        // The last page must have a distinct successor for its next-page handle.
        if page == 0 || page == u32::MAX {
            return Err(ClientError::InvalidRequest(format!(
                "page {} is out of range (1..{})",
                page,
                u32::MAX
            )));
        }

        let params = self.request.to_params(page, &self.api_key);
        debug!(page, query = %self.request.query, "Fetching search page");

        let body = self.transport.get(&self.search_path, &params).await?;
        trace!(page, bytes = body.len(), "Received search response");

        let next_page = NextPage::new(self.clone(), page + 1);
        decode(&body)
            .and_then(|tree| make_search_result_page(&tree, page, next_page))
            .inspect_err(|e| debug!(page, error = %e, "Failed to decode search response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProjectStatus, ReferenceKind, SortOrder};

    const PAGE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<search_results>
  <available>57</available>
  <results>
    <project>
      <name>Community Garden</name>
      <id>11</id>
      <likeminded_url>/p/11</likeminded_url>
      <location>Oakland</location>
    </project>
    <resource>
      <name>Food Bank</name>
      <id>42</id>
      <likeminded_url>/r/42</likeminded_url>
      <location>Oakland</location>
    </resource>
  </results>
</search_results>"#;

    fn client_with(mock: &Arc<MockTransport>) -> LikeMindedClient {
        LikeMindedClient::with_transport("secret", mock.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_all_parameters() {
        let mock = Arc::new(MockTransport::with_body(PAGE_XML));
        let client = client_with(&mock);

        let request = SearchRequest::new("garden")
            .category(vec![1, 2, 3])
            .subcategory("9")
            .status(ProjectStatus::Ongoing)
            .sort(SortOrder::Recent);
        client.search(&request).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, DEFAULT_SEARCH_PATH);

        let names: Vec<_> = calls[0].params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["query", "category", "subcategory", "type", "status", "sort", "page", "apikey"]
        );
        assert_eq!(calls[0].param("query"), Some("garden"));
        assert_eq!(calls[0].param("category"), Some("1,2,3"));
        assert_eq!(calls[0].param("subcategory"), Some("9"));
        assert_eq!(calls[0].param("type"), Some("All"));
        assert_eq!(calls[0].param("status"), Some("1"));
        assert_eq!(calls[0].param("sort"), Some("Recent"));
        assert_eq!(calls[0].param("page"), Some("1"));
        assert_eq!(calls[0].param("apikey"), Some("secret"));
    }

    #[tokio::test]
    async fn test_search_builds_page() {
        let mock = Arc::new(MockTransport::with_body(PAGE_XML));
        let page = client_with(&mock)
            .search(&SearchRequest::default())
            .await
            .unwrap();

        assert_eq!(page.available(), 57);
        assert_eq!(page.page(), 1);
        assert_eq!(page.len(), 2);
        assert_eq!(page.references()[0].kind(), ReferenceKind::Project);
        assert_eq!(page.references()[1].kind(), ReferenceKind::Resource);
        assert_eq!(page.next_page().page(), 2);
    }

    #[tokio::test]
    async fn test_next_page_is_lazy_and_not_memoized() {
        let mock = Arc::new(MockTransport::with_body(PAGE_XML));
        let client = client_with(&mock);
        let request = SearchRequest::new("garden").category(vec!["a", "b"]);

        let first = client.search(&request).await.unwrap();
        assert_eq!(mock.call_count(), 1);

        first.next_page().fetch().await.unwrap();
        first.next_page().fetch().await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        for call in &calls[1..] {
            assert_eq!(call.param("page"), Some("2"));
            for name in ["query", "category", "subcategory", "type", "status", "sort", "apikey"] {
                assert_eq!(call.param(name), calls[0].param(name), "parameter {}", name);
            }
        }
    }

    #[tokio::test]
    async fn test_next_page_handles_evaluate_out_of_order() {
        let mock = Arc::new(MockTransport::with_body(PAGE_XML));
        let client = client_with(&mock);

        let first = client.search(&SearchRequest::new("x")).await.unwrap();
        let second = first.next_page().fetch().await.unwrap();
        let third = second.next_page().fetch().await.unwrap();
        assert_eq!(third.page(), 3);

        let again = first.next_page().fetch().await.unwrap();
        assert_eq!(again.page(), 2);
        assert_eq!(mock.calls().last().unwrap().param("page"), Some("2"));
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let mock = Arc::new(MockTransport::new());
        mock.push_error("connection refused");

        let err = client_with(&mock)
            .search(&SearchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(msg) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn test_missing_available_is_decode_error() {
        let mock = Arc::new(MockTransport::with_body(
            "<search_results><results><project><id>1</id></project></results></search_results>",
        ));

        let err = client_with(&mock)
            .search(&SearchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_search_page_rejects_zero() {
        let mock = Arc::new(MockTransport::with_body(PAGE_XML));
        let client = client_with(&mock);

        let err = client.search_page(&SearchRequest::default(), 0).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
        assert_eq!(mock.call_count(), 0);

        let page = client.search_page(&SearchRequest::default(), 4).await.unwrap();
        assert_eq!(page.page(), 4);
        assert_eq!(page.next_page().page(), 5);
    }

    #[tokio::test]
    async fn test_last_page_number_is_rejected() {
        let mock = Arc::new(MockTransport::with_body(PAGE_XML));
        let client = client_with(&mock);
        let request = SearchRequest::default();

        let err = client.search_page(&request, u32::MAX).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
        assert_eq!(mock.call_count(), 0);

        // The page before it still loads, and its handle never repeats it.
        let page = client.search_page(&request, u32::MAX - 1).await.unwrap();
        assert_eq!(page.next_page().page(), u32::MAX);
        assert!(matches!(
            page.next_page().fetch().await,
            Err(ClientError::InvalidRequest(_))
        ));
        assert!(matches!(
            client.page_handle(&request, 0).fetch().await,
            Err(ClientError::InvalidRequest(_))
        ));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mock: Arc<dyn Transport> = Arc::new(MockTransport::new());
        assert!(matches!(
            LikeMindedClient::with_transport("  ", mock),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = Config::default();
        config.api.api_key = None;
        assert!(matches!(
            LikeMindedClient::from_config(&config),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_search_path() {
        let mock = Arc::new(MockTransport::with_body(PAGE_XML));
        let client = client_with(&mock).with_search_path("/v2/search");
        client.search(&SearchRequest::default()).await.unwrap();
        assert_eq!(mock.calls()[0].path, "/v2/search");
    }
}
