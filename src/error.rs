//! Error types for the Steam chat client.
//!
//! Transport-level failures (unreachable host, timeout) never show up here:
//! the [`RequestExecutor`](crate::executor::RequestExecutor) folds them into a
//! [`Response`] with the matching [`ResponseStatus`](crate::response::ResponseStatus).
//! Everything that reaches a caller as an `Err` is either a pre-flight problem
//! ([`SteamError::MalformedEndpoint`]) or a business-level failure carried by a
//! [`RequestError`].

use thiserror::Error;

use crate::auth::AuthKind;
use crate::response::Response;
use crate::status;

/// Which part of a request went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// The exchange completed with a non-success status, or never completed.
    Request,
    /// The exchange succeeded but the payload did not match the expected shape.
    Deserialization,
    /// The server rejected the credentials (HTTP 401 or a "not logged on" poll).
    Authentication,
}

/// A business-level request failure.
///
/// Carries the original [`Response`] so callers can inspect the status code
/// and raw content.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RequestError {
    kind: RequestErrorKind,
    message: String,
    response: Response,
    #[source]
    source: Option<serde_json::Error>,
}

impl RequestError {
    /// Build a request-issue error whose message is derived from the HTTP status.
    pub fn from_response(response: Response) -> Self {
        let kind = if response.status_code == 401 {
            RequestErrorKind::Authentication
        } else {
            RequestErrorKind::Request
        };
        let message = status::describe(&response);
        Self {
            kind,
            message,
            response,
            source: None,
        }
    }

    /// Build a deserialization-issue error for a response whose body could not be decoded.
    pub fn deserialization(response: Response, source: serde_json::Error) -> Self {
        Self {
            kind: RequestErrorKind::Deserialization,
            message: format!("unable to decode response payload: {source}"),
            response,
            source: Some(source),
        }
    }

    /// Build an authentication-issue error with a custom message.
    pub fn authentication(response: Response, message: impl Into<String>) -> Self {
        Self {
            kind: RequestErrorKind::Authentication,
            message: message.into(),
            response,
            source: None,
        }
    }

    /// Build a request-issue error for a completed exchange whose payload
    /// reported a failure status.
    pub fn rejected(response: Response, message: impl Into<String>) -> Self {
        Self {
            kind: RequestErrorKind::Request,
            message: message.into(),
            response,
            source: None,
        }
    }

    pub fn kind(&self) -> RequestErrorKind {
        self.kind
    }

    pub fn is_request_issue(&self) -> bool {
        self.kind == RequestErrorKind::Request
    }

    pub fn is_deserialization_issue(&self) -> bool {
        self.kind == RequestErrorKind::Deserialization
    }

    pub fn is_authentication_issue(&self) -> bool {
        self.kind == RequestErrorKind::Authentication
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The response the error was raised for.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// HTTP status code of the underlying response (0 if no exchange completed).
    pub fn status_code(&self) -> u16 {
        self.response.status_code
    }
}

/// Errors that can occur when using the Steam chat client.
#[derive(Debug, Error)]
pub enum SteamError {
    /// The base endpoint is not a well-formed URI. Raised before any network activity.
    #[error("malformed endpoint: {0}")]
    MalformedEndpoint(String),

    /// A request failed at the business level (non-2xx or bad payload).
    #[error("request failed: {0}")]
    Request(Box<RequestError>),

    /// The server rejected our credentials. Never retried automatically.
    #[error("authentication failed: {0}")]
    Authentication(Box<RequestError>),

    /// Failed to serialize a request body.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The executor is not carrying the kind of credential the operation needs.
    #[error("missing credentials: {0} authenticator required")]
    MissingCredentials(AuthKind),

    /// The operation requires an active chat session.
    #[error("not connected to chat")]
    NotConnected,

    /// `log_on` was called while a connection is already running.
    #[error("chat connection already active")]
    AlreadyConnected,

    /// A SteamID string or number could not be interpreted.
    #[error("invalid SteamID: {0}")]
    InvalidSteamId(String),

    /// An I/O error occurred while setting up a runtime.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SteamError {
    /// Wrap a [`RequestError`], routing authentication issues to [`SteamError::Authentication`].
    pub fn from_request(err: RequestError) -> Self {
        if err.is_authentication_issue() {
            Self::Authentication(Box::new(err))
        } else {
            Self::Request(Box::new(err))
        }
    }

    /// The underlying request error, if any.
    pub fn request_error(&self) -> Option<&RequestError> {
        match self {
            Self::Request(err) | Self::Authentication(err) => Some(err),
            _ => None,
        }
    }

    /// `true` for 404-class failures, which the chat loop treats as transient.
    pub fn is_not_found(&self) -> bool {
        self.request_error()
            .is_some_and(|err| err.status_code() == 404)
    }

    /// `true` for authentication failures, which the chat loop treats as fatal.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

impl From<RequestError> for SteamError {
    fn from(err: RequestError) -> Self {
        Self::from_request(err)
    }
}

/// A specialized [`Result`] type for Steam client operations.
pub type Result<T> = std::result::Result<T, SteamError>;
