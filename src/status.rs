//! Classification of request outcomes into human-readable failure messages.
//!
//! The Steam Web API reports most failures through plain HTTP status codes
//! with little or no body, so [`StatusClass`] is what turns a [`Response`]
//! into the message carried by a [`RequestError`](crate::error::RequestError).

use std::fmt;

use crate::response::{Response, ResponseStatus};

/// Coarse classification of a request outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    // Completed exchanges
    Success,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    TooManyRequests,
    ServerError,
    ServiceUnavailable,
    OtherClientError,

    // Exchanges that never completed
    TimedOut,
    Unreachable,
    Aborted,
    Unknown,
}

impl StatusClass {
    /// Classify a bare HTTP status code from a completed exchange.
    pub fn from_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Success,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::TooManyRequests,
            503 => Self::ServiceUnavailable,
            500..=599 => Self::ServerError,
            _ => Self::OtherClientError,
        }
    }

    /// Classify a [`Response`], taking the transport outcome into account.
    pub fn of(response: &Response) -> Self {
        match response.response_status {
            ResponseStatus::Completed => Self::from_code(response.status_code),
            ResponseStatus::TimedOut => Self::TimedOut,
            ResponseStatus::Error => Self::Unreachable,
            ResponseStatus::Aborted => Self::Aborted,
            ResponseStatus::None => Self::Unknown,
        }
    }

    /// Returns a human-readable description of this class.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "The request completed successfully.",
            Self::BadRequest => {
                "The server could not understand the request. Check the request parameters."
            }
            Self::Unauthorized => {
                "Access denied. The API key or access token is missing, invalid or expired."
            }
            Self::Forbidden => {
                "The credentials are valid but not permitted to access this resource."
            }
            Self::NotFound => {
                "The requested resource could not be found. The session may have expired."
            }
            Self::TooManyRequests => "Too many requests in a short time. Slow down and retry later.",
            Self::ServerError => "The remote server failed to process the request.",
            Self::ServiceUnavailable => {
                "The service is temporarily unavailable. Please try again in a few moments."
            }
            Self::OtherClientError => "The server rejected the request.",
            Self::TimedOut => "The request did not complete before its timeout elapsed.",
            Self::Unreachable => "The remote host could not be reached.",
            Self::Aborted => "The request was aborted before it completed.",
            Self::Unknown => "The request was never dispatched.",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Build the message for a failed [`Response`].
///
/// Completed exchanges are described by their status line; anything else by
/// the transport error message, when one was recorded.
pub fn describe(response: &Response) -> String {
    let class = StatusClass::of(response);
    match response.response_status {
        ResponseStatus::Completed => {
            let description = if response.status_description.is_empty() {
                "HTTP error"
            } else {
                response.status_description.as_str()
            };
            format!("{description} ({}): {class}", response.status_code)
        }
        _ => match &response.error_message {
            Some(detail) => format!("{class} ({detail})"),
            None => class.to_string(),
        },
    }
}
