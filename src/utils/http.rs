//! HTTP transport utilities.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::client::ClientError;
use crate::config::HttpConfig;

/// Root of the public search service
pub const DEFAULT_BASE_URL: &str = "http://v1.api.likeminded.exygy.com";

/// Performs GET requests against the search service.
///
/// Implementations own timeouts and connection handling; the client never
/// retries a failed call.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// GET `path` relative to the base endpoint with the given query
    /// parameters and return the raw response body.
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<String, ClientError>;
}

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Arc<Client>,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport with default timeouts
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_settings(base_url, &HttpConfig::default())
    }

    /// Create a transport with explicit HTTP settings
    pub fn with_settings(base_url: &str, settings: &HttpConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(settings.user_agent())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Self::from_client(Arc::new(client), base_url)
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base URL {:?}: {}", base_url, e))
        })?;

        Ok(Self { client, base_url })
    }

    /// Base endpoint requests are made against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join `path` onto the base URL, keeping any path prefix the base carries
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid endpoint {:?}: {}", joined, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<String, ClientError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/xml")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport(format!(
                "search API returned status: {}",
                status
            )));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let transport = HttpTransport::new("http://example.com").unwrap();
        assert_eq!(
            transport.endpoint("/search/").unwrap().as_str(),
            "http://example.com/search/"
        );

        let transport = HttpTransport::new("http://example.com/api/").unwrap();
        assert_eq!(
            transport.endpoint("search/").unwrap().as_str(),
            "http://example.com/api/search/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_get_sends_query_and_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("query".into(), "food bank".into()),
                mockito::Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body("<ok/>")
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url()).unwrap();
        let params = vec![
            ("query".to_string(), "food bank".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        let body = transport.get("/search/", &params).await.unwrap();

        assert_eq!(body, "<ok/>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url()).unwrap();
        let err = transport.get("/search/", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(msg) if msg.contains("503")));
    }
}
