//! HTTP transport
//!
//! Thin wrapper over reqwest that applies the fixed per-request
//! deadline and classifies transport failures. Retry semantics live in
//! the request pipeline, not here: the transport dispatches exactly
//! once per call.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use thiserror::Error;
use tracing::debug;

/// Transport-level failure
///
/// Timeouts are ordinary transport failures; they never enter the
/// credential renewal path.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The fixed deadline elapsed before a response arrived
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport failure
    #[error("transport failure: {0}")]
    Other(String),
}

/// HTTP client with a fixed per-request deadline
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// The configured per-request deadline
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Dispatch the request once, classifying transport failures.
    ///
    /// # Errors
    /// Returns [`TransportError`] on timeout, connection failure, or
    /// any other failure before a response was produced. HTTP error
    /// statuses are not transport errors; callers classify those.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, TransportError> {
        match builder.send().await {
            Ok(response) => {
                debug!(status = %response.status(), url = %response.url(), "received HTTP response");
                Ok(response)
            }
            Err(err) if err.is_timeout() => {
                debug!(error = %err, "HTTP request timed out");
                Err(TransportError::Timeout(self.timeout))
            }
            Err(err) if err.is_connect() => {
                debug!(error = %err, "HTTP connection failed");
                Err(TransportError::Connect(err.to_string()))
            }
            Err(err) => {
                debug!(error = %err, "HTTP request failed");
                Err(TransportError::Other(err.to_string()))
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl HttpClientBuilder {
    /// Fixed deadline applied to every dispatched request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns error if the underlying reqwest client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpClient, TransportError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| TransportError::Other(err.to_string()))?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for http::client.
    use std::net::TcpListener;

    use reqwest::StatusCode;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// A success response passes through untouched.
    #[tokio::test]
    async fn test_returns_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::builder().build().unwrap();
        let response = client.send(client.request(Method::GET, server.uri())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    /// Error statuses are returned as responses, not transport errors.
    #[tokio::test]
    async fn test_error_status_is_not_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::builder().build().unwrap();
        let response = client.send(client.request(Method::GET, server.uri())).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    /// A slow upstream surfaces as a timeout after the fixed deadline.
    #[tokio::test]
    async fn test_deadline_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::builder().timeout(Duration::from_millis(100)).build().unwrap();
        let result = client.send(client.request(Method::GET, server.uri())).await;
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }

    /// A refused connection is classified as a connect failure.
    #[tokio::test]
    async fn test_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so requests fail with ECONNREFUSED
        let url = format!("http://{addr}");

        let client = HttpClient::builder().build().unwrap();
        let result = client.send(client.request(Method::GET, &url)).await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
