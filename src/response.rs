//! Normalized outcome of one request execution.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::RequestError;

/// Whether the HTTP exchange itself completed.
///
/// A completed exchange is always [`Completed`](ResponseStatus::Completed),
/// whatever its status code; 4xx/5xx show up as `is_successful == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseStatus {
    #[default]
    None,
    Completed,
    Error,
    TimedOut,
    Aborted,
}

/// Shared handle on the transport error that caused a failed exchange.
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync>;

/// Result of a single request execution. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status_code: u16,
    pub status_description: String,
    pub content: String,
    pub is_successful: bool,
    pub response_status: ResponseStatus,
    pub error_message: Option<String>,
    pub error_cause: Option<ErrorCause>,
}

impl Response {
    /// A completed HTTP exchange.
    pub fn completed(
        status_code: u16,
        status_description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            status_description: status_description.into(),
            content: content.into(),
            is_successful: (200..300).contains(&status_code),
            response_status: ResponseStatus::Completed,
            error_message: None,
            error_cause: None,
        }
    }

    /// An exchange that never completed.
    pub fn failed(
        response_status: ResponseStatus,
        message: impl Into<String>,
        cause: Option<ErrorCause>,
    ) -> Self {
        Self {
            response_status,
            error_message: Some(message.into()),
            error_cause: cause,
            ..Self::default()
        }
    }

    /// Returns `self` for a successful exchange, a request-issue error otherwise.
    pub fn error_for_status(self) -> Result<Self, RequestError> {
        if self.is_successful {
            Ok(self)
        } else {
            Err(RequestError::from_response(self))
        }
    }

    /// Decode the content as JSON after checking for success.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        let response = self.error_for_status()?;
        match serde_json::from_str(&response.content) {
            Ok(value) => Ok(value),
            Err(e) => Err(RequestError::deserialization(response, e)),
        }
    }
}
