//! [`reqwest`]-backed implementation of [`HttpTransport`].
//!
//! # Feature gate
//!
//! This module is only available when the `transport-reqwest` feature is
//! enabled (it is enabled by default).

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::request::Method;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// An [`HttpTransport`] backed by a shared [`reqwest::Client`].
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default client settings.
    ///
    /// Timeouts are applied per request from [`HttpRequest::timeout`], so the
    /// client itself carries none.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wrap an existing client (custom TLS, proxy, connection pool settings).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Patch => reqwest::Method::PATCH,
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::TimedOut(err.to_string())
    } else {
        TransportError::Failed(err.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.uri)
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            if let Some(content_type) = body.content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            builder = builder.body(body.content);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await.map_err(classify)?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "HTTP exchange completed");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request(uri: String, timeout: Duration) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            uri,
            headers: vec![("User-Agent".into(), "test".into())],
            body: None,
            timeout,
        }
    }

    /// Serve a single canned HTTP response on a local port.
    async fn start_mock_server(raw_response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut tcp, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = tcp.read(&mut buf).await.unwrap();
            tcp.write_all(raw_response.as_bytes()).await.unwrap();
            tcp.shutdown().await.unwrap();
        });

        format!("http://{addr}/")
    }

    #[test]
    fn reqwest_transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestTransport>();
    }

    #[tokio::test]
    async fn completed_exchange_reports_status_and_body() {
        let uri = start_mock_server(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 7\r\nConnection: close\r\n\r\nmissing",
        )
        .await;

        let response = ReqwestTransport::new()
            .dispatch(request(uri, Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.reason, "Not Found");
        assert_eq!(response.body, "missing");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_failure() {
        let err = ReqwestTransport::new()
            .dispatch(request("http://127.0.0.1:1/".into(), Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Failed(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_tcp, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let err = ReqwestTransport::new()
            .dispatch(request(format!("http://{addr}/"), Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::TimedOut(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn relative_uri_is_a_failure() {
        let err = ReqwestTransport::new()
            .dispatch(request("api/resource".into(), Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Failed(_)));
    }
}
