//! HTTP transport for signed requests.

use crate::config::ClientOptions;
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use wreq::Client;

/// Status and body of an HTTP response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET. Implementations never retry and always return the
/// body, so error payloads reach the classifier.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawResponse>;
}

/// Transport backed by a `wreq` client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the timeouts and proxy from `options`.
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(options.connect_timeout_secs));

        if let Some(proxy_url) = &options.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url)
                .map_err(|e| ApiError::Config(format!("Failed to configure proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<RawResponse> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/xml, text/xml;q=0.9, */*;q=0.5")
            .send()
            .await
            .map_err(|e| ApiError::transport(url, e))?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        let body = response.text().await.map_err(|e| ApiError::transport(url, e))?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_raw_response_success() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(403, "").is_success());
        assert!(!RawResponse::new(503, "").is_success());
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/onca/xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<ItemSearchResponse/>"))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&ClientOptions::default()).unwrap();
        let response = transport.fetch(&format!("{}/onca/xml", mock_server.uri())).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<ItemSearchResponse/>");
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/onca/xml"))
            .respond_with(ResponseTemplate::new(403).set_body_string("<Error>denied</Error>"))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&ClientOptions::default()).unwrap();
        let response = transport.fetch(&format!("{}/onca/xml", mock_server.uri())).await.unwrap();
        assert_eq!(response.status, 403);
        assert!(response.body.contains("denied"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Bind then drop a listener so the port is very likely closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let options = ClientOptions { connect_timeout_secs: 2, timeout_secs: 2, ..Default::default() };
        let transport = HttpTransport::new(&options).unwrap();
        let url = format!("http://{}/onca/xml", addr);

        let err = transport.fetch(&url).await.unwrap_err();
        match err {
            ApiError::Transport { url: failed, .. } => assert_eq!(failed, url),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
