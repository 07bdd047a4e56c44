//! HTTP transport abstraction used by the request executor.
//!
//! The [`HttpTransport`] trait is the only place network I/O happens. The
//! executor builds a fully resolved [`HttpRequest`] (final URI, headers,
//! serialized body, effective timeout) and hands it to the transport; the
//! transport reports either a completed exchange or a [`TransportError`].
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use steam_chat_client::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
//!
//! #[derive(Debug)]
//! struct CannedTransport;
//!
//! #[async_trait]
//! impl HttpTransport for CannedTransport {
//!     async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
//!         Ok(HttpResponse::new(200, "OK", r#"{"error":"OK"}"#))
//!     }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::request::Method;

/// Serialized request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBody {
    pub content: String,
    /// `None` for raw bodies, which are sent without a content type.
    pub content_type: Option<String>,
}

/// A fully resolved request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Look up a header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A completed HTTP exchange, whatever its status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            body: body.into(),
        }
    }
}

/// An exchange that did not complete.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The call was cancelled or its deadline elapsed.
    #[error("request timed out: {0}")]
    TimedOut(String),

    /// DNS, connection or protocol failure.
    #[error("transport failure: {0}")]
    Failed(String),
}

/// Sends resolved HTTP requests.
///
/// Implementations must honor [`HttpRequest::timeout`] where they can; the
/// executor also enforces it around [`dispatch`](HttpTransport::dispatch).
///
/// # Cancel Safety
///
/// The returned future may be dropped at any await point (a chat disconnect
/// cancels the in-flight poll this way). Dropping it must abort the exchange
/// without leaving shared state inconsistent.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// Perform one HTTP exchange.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received. Non-2xx
    /// responses are *not* errors at this level.
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
