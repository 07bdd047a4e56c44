//! Abstract request description consumed by the
//! [`RequestExecutor`](crate::executor::RequestExecutor).

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::parameter::{ParameterKind, ParameterSet};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
        }
    }

    /// POST and PUT carry a serialized body; every other method does not.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a POST/PUT body is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// Body parameter's text sent verbatim, no content type.
    Raw,
    /// JSON object or the sole body value.
    Json,
    /// `key=value&...`, percent-encoded.
    #[default]
    FormUrlEncoded,
}

/// A request description.
///
/// Owned by its caller; the authenticator and executor add parameters and bump
/// [`attempts`](Request::attempts) as the request passes through them.
///
/// # Example
///
/// ```
/// use steam_chat_client::request::{Method, Request};
///
/// let request = Request::new("ISteamUser/GetFriendList/v0001", Method::Get)
///     .with_query("steamid", "76561197960287930")
///     .with_query("relationship", "friend");
/// assert_eq!(request.parameters().len(), 2);
/// assert_eq!(request.attempts(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    resource: String,
    method: Method,
    parameters: ParameterSet,
    timeout: Option<Duration>,
    body_format: Option<DataFormat>,
    attempts: u32,
}

impl Request {
    pub fn new(resource: impl Into<String>, method: Method) -> Self {
        Self {
            resource: resource.into(),
            method,
            parameters: ParameterSet::new(),
            timeout: None,
            body_format: None,
            attempts: 0,
        }
    }

    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(resource, Method::Get)
    }

    pub fn post(resource: impl Into<String>) -> Self {
        Self::new(resource, Method::Post)
    }

    // ── Builders ────────────────────────────────────────────────────

    #[must_use]
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        kind: ParameterKind,
    ) -> Self {
        self.parameters.add(name, value, kind);
        self
    }

    /// Form field for POST/PUT, query parameter otherwise.
    #[must_use]
    pub fn with_param(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_parameter(name, value, ParameterKind::FormOrQuery)
    }

    #[must_use]
    pub fn with_query(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_parameter(name, value, ParameterKind::QueryString)
    }

    #[must_use]
    pub fn with_url_segment(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_parameter(name, value, ParameterKind::UrlSegment)
    }

    #[must_use]
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_parameter(name, value.into(), ParameterKind::Header)
    }

    #[must_use]
    pub fn with_body(self, value: impl Into<Value>) -> Self {
        self.with_parameter("body", value, ParameterKind::Body)
    }

    /// Per-request timeout. Zero means "use the executor default".
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_body_format(mut self, format: DataFormat) -> Self {
        self.body_format = Some(format);
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn body_format(&self) -> Option<DataFormat> {
        self.body_format
    }

    /// Number of transport attempts made with this request. Never reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }
}
